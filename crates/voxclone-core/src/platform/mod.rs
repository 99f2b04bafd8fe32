//! Voice platform port.
//!
//! `PlatformApi` is the CRUD surface the reconciliation engine needs for the
//! two resource kinds. The HTTP implementation lives in voxclone-infra; the
//! core crate never depends on an HTTP library.

pub mod retry;

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use voxclone_types::credential::Redacted;
use voxclone_types::error::PlatformError;
use voxclone_types::resource::{Resource, ResourceKind};

/// CRUD operations on a user's tools and assistants.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
/// Implementations are expected to retry transient failures themselves and
/// to surface everything else as a typed [`PlatformError`].
pub trait PlatformApi: Send + Sync {
    /// List every resource of `kind` in the account.
    fn list(
        &self,
        kind: ResourceKind,
    ) -> impl Future<Output = Result<Vec<Resource>, PlatformError>> + Send;

    /// Fetch one resource by id.
    fn get(
        &self,
        kind: ResourceKind,
        id: &str,
    ) -> impl Future<Output = Result<Resource, PlatformError>> + Send;

    /// Create a resource from a sanitized body. The platform assigns `id`.
    fn create(
        &self,
        kind: ResourceKind,
        body: &Value,
    ) -> impl Future<Output = Result<Resource, PlatformError>> + Send;

    /// Partially update an existing resource.
    fn update(
        &self,
        kind: ResourceKind,
        id: &str,
        body: &Value,
    ) -> impl Future<Output = Result<Resource, PlatformError>> + Send;

    /// Permanently delete a resource.
    fn delete(
        &self,
        kind: ResourceKind,
        id: &str,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;
}

impl<T: PlatformApi> PlatformApi for Arc<T> {
    async fn list(&self, kind: ResourceKind) -> Result<Vec<Resource>, PlatformError> {
        (**self).list(kind).await
    }

    async fn get(&self, kind: ResourceKind, id: &str) -> Result<Resource, PlatformError> {
        (**self).get(kind, id).await
    }

    async fn create(&self, kind: ResourceKind, body: &Value) -> Result<Resource, PlatformError> {
        (**self).create(kind, body).await
    }

    async fn update(
        &self,
        kind: ResourceKind,
        id: &str,
        body: &Value,
    ) -> Result<Resource, PlatformError> {
        (**self).update(kind, id, body).await
    }

    async fn delete(&self, kind: ResourceKind, id: &str) -> Result<(), PlatformError> {
        (**self).delete(kind, id).await
    }
}

/// Builds a [`PlatformApi`] bound to one user's decrypted API key.
///
/// The key only lives for the duration of one reconciliation; connectors
/// must not cache clients across users.
pub trait PlatformConnector: Send + Sync {
    type Api: PlatformApi;

    fn connect(&self, api_key: &Redacted) -> Result<Self::Api, PlatformError>;
}
