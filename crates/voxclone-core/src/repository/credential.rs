//! Credential store trait definition.

use std::future::Future;

use voxclone_types::credential::{CredentialRecord, Redacted, UserId};
use voxclone_types::error::CredentialError;

/// Encrypt-at-rest storage of a user's platform credentials and of the ids
/// produced by their last successful reconciliation.
///
/// Implementations encrypt the API key and web token before they touch
/// storage and hand them back wrapped in [`Redacted`]. Metadata reads
/// ([`CredentialStore::record`]) never decrypt anything.
pub trait CredentialStore: Send + Sync {
    /// Store (or replace) the user's API key and optional web token.
    ///
    /// Replacing credentials keeps the last known clone ids.
    fn link(
        &self,
        user: &UserId,
        api_key: &str,
        web_token: Option<&str>,
    ) -> impl Future<Output = Result<(), CredentialError>> + Send;

    /// Decrypted platform API key, if linked.
    fn api_key(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<Option<Redacted>, CredentialError>> + Send;

    /// Decrypted web token, if one was stored.
    fn web_token(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<Option<Redacted>, CredentialError>> + Send;

    /// Metadata for the user's credentials, without decrypting them.
    fn record(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<Option<CredentialRecord>, CredentialError>> + Send;

    /// Remember the ids produced by a successful reconciliation.
    ///
    /// Fails with [`CredentialError::NotLinked`] when the user has no row.
    fn save_clone_ids(
        &self,
        user: &UserId,
        assistant_id: &str,
        tool_id: &str,
    ) -> impl Future<Output = Result<(), CredentialError>> + Send;

    /// Delete everything stored for the user.
    ///
    /// Fails with [`CredentialError::NotLinked`] when there is nothing to delete.
    fn unlink(&self, user: &UserId) -> impl Future<Output = Result<(), CredentialError>> + Send;
}
