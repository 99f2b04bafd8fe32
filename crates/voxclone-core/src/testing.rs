//! In-memory fakes for the platform and credential ports.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use chrono::Utc;
use serde_json::{Value, json};

use voxclone_types::credential::{CredentialRecord, Redacted, UserId};
use voxclone_types::error::{CredentialError, PlatformError};
use voxclone_types::resource::{Resource, ResourceKind};

use crate::platform::{PlatformApi, PlatformConnector};
use crate::repository::credential::CredentialStore;

pub fn status_error(status: u16) -> PlatformError {
    PlatformError::Status {
        status,
        body: json!({ "message": format!("simulated {status}") }),
    }
}

/// A scripted voice platform account.
#[derive(Default)]
pub struct FakePlatform {
    resources: Mutex<HashMap<ResourceKind, Vec<Resource>>>,
    next_id: AtomicU32,
    /// Ids whose deletion fails with a 500.
    pub failing_deletes: Mutex<HashSet<String>>,
    /// Error returned by every create of this kind.
    pub failing_creates: Mutex<HashMap<ResourceKind, PlatformError>>,
    /// Error returned by every list call.
    pub failing_list: Mutex<Option<PlatformError>>,
    /// Bodies submitted to `create`, in order.
    pub created_bodies: Mutex<Vec<(ResourceKind, Value)>>,
    /// Ids passed to `delete`, in order.
    pub delete_calls: Mutex<Vec<String>>,
    /// Simulated latency of every list call.
    pub list_delay: Mutex<Option<Duration>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing resource in the account.
    pub fn seed(&self, kind: ResourceKind, id: &str, name: &str) {
        let resource = Resource {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            fields: Default::default(),
        };
        self.resources
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .push(resource);
    }

    pub fn fail_delete(&self, id: &str) {
        self.failing_deletes.lock().unwrap().insert(id.to_string());
    }

    pub fn fail_create(&self, kind: ResourceKind, err: PlatformError) {
        self.failing_creates.lock().unwrap().insert(kind, err);
    }

    pub fn fail_list(&self, err: PlatformError) {
        *self.failing_list.lock().unwrap() = Some(err);
    }

    pub fn slow_list(&self, delay: Duration) {
        *self.list_delay.lock().unwrap() = Some(delay);
    }

    /// Ids currently present for `kind`, in list order.
    pub fn ids(&self, kind: ResourceKind) -> Vec<String> {
        self.resources
            .lock()
            .unwrap()
            .get(&kind)
            .map(|items| items.iter().filter_map(|r| r.id.clone()).collect())
            .unwrap_or_default()
    }

    pub fn created_count(&self) -> usize {
        self.created_bodies.lock().unwrap().len()
    }
}

impl PlatformApi for FakePlatform {
    async fn list(&self, kind: ResourceKind) -> Result<Vec<Resource>, PlatformError> {
        let delay = *self.list_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.failing_list.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self
            .resources
            .lock()
            .unwrap()
            .get(&kind)
            .cloned()
            .unwrap_or_default())
    }

    async fn get(&self, kind: ResourceKind, id: &str) -> Result<Resource, PlatformError> {
        self.resources
            .lock()
            .unwrap()
            .get(&kind)
            .and_then(|items| items.iter().find(|r| r.id.as_deref() == Some(id)).cloned())
            .ok_or_else(|| status_error(404))
    }

    async fn create(&self, kind: ResourceKind, body: &Value) -> Result<Resource, PlatformError> {
        if let Some(err) = self.failing_creates.lock().unwrap().get(&kind).cloned() {
            return Err(err);
        }
        self.created_bodies
            .lock()
            .unwrap()
            .push((kind, body.clone()));

        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut resource = Resource::from_value(body.clone())
            .map_err(|e| PlatformError::Decode(e.to_string()))?;
        resource.id = Some(format!("new_{}_{n}", kind.singular()));
        self.resources
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .push(resource.clone());
        Ok(resource)
    }

    async fn update(
        &self,
        kind: ResourceKind,
        id: &str,
        body: &Value,
    ) -> Result<Resource, PlatformError> {
        let mut resources = self.resources.lock().unwrap();
        let existing = resources
            .get_mut(&kind)
            .and_then(|items| items.iter_mut().find(|r| r.id.as_deref() == Some(id)))
            .ok_or_else(|| status_error(404))?;
        let patch = Resource::from_value(body.clone())
            .map_err(|e| PlatformError::Decode(e.to_string()))?;
        if patch.name.is_some() {
            existing.name = patch.name;
        }
        existing.fields.extend(patch.fields);
        Ok(existing.clone())
    }

    async fn delete(&self, kind: ResourceKind, id: &str) -> Result<(), PlatformError> {
        self.delete_calls.lock().unwrap().push(id.to_string());
        if self.failing_deletes.lock().unwrap().contains(id) {
            return Err(status_error(500));
        }
        let mut resources = self.resources.lock().unwrap();
        let items = resources.entry(kind).or_default();
        let before = items.len();
        items.retain(|r| r.id.as_deref() != Some(id));
        if items.len() == before {
            return Err(status_error(404));
        }
        Ok(())
    }
}

/// Connector handing out one shared fake, recording the keys it saw.
pub struct FakeConnector {
    pub platform: std::sync::Arc<FakePlatform>,
    pub seen_keys: Mutex<Vec<String>>,
}

impl FakeConnector {
    pub fn new(platform: std::sync::Arc<FakePlatform>) -> Self {
        Self {
            platform,
            seen_keys: Mutex::new(Vec::new()),
        }
    }
}

impl PlatformConnector for FakeConnector {
    type Api = std::sync::Arc<FakePlatform>;

    fn connect(&self, api_key: &Redacted) -> Result<Self::Api, PlatformError> {
        self.seen_keys
            .lock()
            .unwrap()
            .push(api_key.expose().to_string());
        Ok(self.platform.clone())
    }
}

struct StoredCredential {
    api_key: String,
    web_token: Option<String>,
    assistant_id: Option<String>,
    tool_id: Option<String>,
}

/// Plaintext in-memory credential store.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    entries: Mutex<HashMap<UserId, StoredCredential>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clone_ids(&self, user: &UserId) -> (Option<String>, Option<String>) {
        self.entries
            .lock()
            .unwrap()
            .get(user)
            .map(|e| (e.assistant_id.clone(), e.tool_id.clone()))
            .unwrap_or((None, None))
    }
}

impl CredentialStore for InMemoryCredentialStore {
    async fn link(
        &self,
        user: &UserId,
        api_key: &str,
        web_token: Option<&str>,
    ) -> Result<(), CredentialError> {
        let mut entries = self.entries.lock().unwrap();
        let (assistant_id, tool_id) = entries
            .remove(user)
            .map(|e| (e.assistant_id, e.tool_id))
            .unwrap_or((None, None));
        entries.insert(
            user.clone(),
            StoredCredential {
                api_key: api_key.to_string(),
                web_token: web_token.map(str::to_string),
                assistant_id,
                tool_id,
            },
        );
        Ok(())
    }

    async fn api_key(&self, user: &UserId) -> Result<Option<Redacted>, CredentialError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(user)
            .map(|e| Redacted::new(e.api_key.clone())))
    }

    async fn web_token(&self, user: &UserId) -> Result<Option<Redacted>, CredentialError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(user)
            .and_then(|e| e.web_token.clone().map(Redacted::new)))
    }

    async fn record(&self, user: &UserId) -> Result<Option<CredentialRecord>, CredentialError> {
        let now = Utc::now();
        Ok(self.entries.lock().unwrap().get(user).map(|e| CredentialRecord {
            user_id: user.clone(),
            has_web_token: e.web_token.is_some(),
            assistant_id: e.assistant_id.clone(),
            tool_id: e.tool_id.clone(),
            created_at: now,
            updated_at: now,
        }))
    }

    async fn save_clone_ids(
        &self,
        user: &UserId,
        assistant_id: &str,
        tool_id: &str,
    ) -> Result<(), CredentialError> {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries.get_mut(user).ok_or(CredentialError::NotLinked)?;
        entry.assistant_id = Some(assistant_id.to_string());
        entry.tool_id = Some(tool_id.to_string());
        Ok(())
    }

    async fn unlink(&self, user: &UserId) -> Result<(), CredentialError> {
        self.entries
            .lock()
            .unwrap()
            .remove(user)
            .map(|_| ())
            .ok_or(CredentialError::NotLinked)
    }
}
