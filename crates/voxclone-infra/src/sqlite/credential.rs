//! SQLite credential store.
//!
//! Implements `CredentialStore` from `voxclone-core`. API keys and web tokens
//! are sealed with [`VaultCrypto`] before they are bound to a query, so the
//! database only ever holds `nonce || ciphertext` BLOBs. Neither plaintext
//! nor ciphertext is logged.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::Row;

use voxclone_core::repository::credential::CredentialStore;
use voxclone_types::credential::{CredentialRecord, Redacted, UserId};
use voxclone_types::error::CredentialError;

use super::pool::DatabasePool;
use crate::crypto::vault::VaultCrypto;

pub struct SqliteCredentialStore {
    pool: DatabasePool,
    vault: Arc<VaultCrypto>,
}

impl SqliteCredentialStore {
    pub fn new(pool: DatabasePool, vault: Arc<VaultCrypto>) -> Self {
        Self { pool, vault }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    fn seal(&self, value: &str) -> Result<Vec<u8>, CredentialError> {
        self.vault.encrypt_str(value).map_err(|_| CredentialError::Crypto)
    }

    fn open(&self, sealed: &[u8]) -> Result<Redacted, CredentialError> {
        self.vault
            .decrypt_str(sealed)
            .map(Redacted::new)
            .map_err(|_| CredentialError::Crypto)
    }

    async fn sealed_column(
        &self,
        user: &UserId,
        column: &'static str,
    ) -> Result<Option<Vec<u8>>, CredentialError> {
        let sql = format!("SELECT {column} FROM credentials WHERE user_id = ?");
        let row = sqlx::query(&sql)
            .bind(user.as_str())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(storage)?;

        match row {
            Some(row) => row.try_get::<Option<Vec<u8>>, _>(column).map_err(storage),
            None => Ok(None),
        }
    }
}

fn storage(e: sqlx::Error) -> CredentialError {
    CredentialError::Storage(e.to_string())
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, CredentialError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CredentialError::Storage(format!("invalid datetime: {e}")))
}

impl CredentialStore for SqliteCredentialStore {
    async fn link(
        &self,
        user: &UserId,
        api_key: &str,
        web_token: Option<&str>,
    ) -> Result<(), CredentialError> {
        let sealed_key = self.seal(api_key)?;
        let sealed_token = web_token.map(|t| self.seal(t)).transpose()?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO credentials (user_id, api_key, web_token, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                api_key = excluded.api_key,
                web_token = excluded.web_token,
                updated_at = excluded.updated_at",
        )
        .bind(user.as_str())
        .bind(&sealed_key)
        .bind(&sealed_token)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(storage)?;

        Ok(())
    }

    async fn api_key(&self, user: &UserId) -> Result<Option<Redacted>, CredentialError> {
        self.sealed_column(user, "api_key")
            .await?
            .map(|sealed| self.open(&sealed))
            .transpose()
    }

    async fn web_token(&self, user: &UserId) -> Result<Option<Redacted>, CredentialError> {
        self.sealed_column(user, "web_token")
            .await?
            .map(|sealed| self.open(&sealed))
            .transpose()
    }

    async fn record(&self, user: &UserId) -> Result<Option<CredentialRecord>, CredentialError> {
        let row = sqlx::query(
            "SELECT web_token IS NOT NULL AS has_web_token, assistant_id, tool_id, created_at, updated_at
             FROM credentials WHERE user_id = ?",
        )
        .bind(user.as_str())
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(storage)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let has_web_token: i64 = row.try_get("has_web_token").map_err(storage)?;
        let created_at: String = row.try_get("created_at").map_err(storage)?;
        let updated_at: String = row.try_get("updated_at").map_err(storage)?;

        Ok(Some(CredentialRecord {
            user_id: user.clone(),
            has_web_token: has_web_token != 0,
            assistant_id: row.try_get("assistant_id").map_err(storage)?,
            tool_id: row.try_get("tool_id").map_err(storage)?,
            created_at: parse_datetime(&created_at)?,
            updated_at: parse_datetime(&updated_at)?,
        }))
    }

    async fn save_clone_ids(
        &self,
        user: &UserId,
        assistant_id: &str,
        tool_id: &str,
    ) -> Result<(), CredentialError> {
        let result = sqlx::query(
            "UPDATE credentials SET assistant_id = ?, tool_id = ?, updated_at = ? WHERE user_id = ?",
        )
        .bind(assistant_id)
        .bind(tool_id)
        .bind(Utc::now().to_rfc3339())
        .bind(user.as_str())
        .execute(&self.pool.writer)
        .await
        .map_err(storage)?;

        if result.rows_affected() == 0 {
            return Err(CredentialError::NotLinked);
        }
        Ok(())
    }

    async fn unlink(&self, user: &UserId) -> Result<(), CredentialError> {
        let result = sqlx::query("DELETE FROM credentials WHERE user_id = ?")
            .bind(user.as_str())
            .execute(&self.pool.writer)
            .await
            .map_err(storage)?;

        if result.rows_affected() == 0 {
            return Err(CredentialError::NotLinked);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> (SqliteCredentialStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::open_in(dir.path()).await.unwrap();
        let vault = Arc::new(VaultCrypto::new(&[9u8; 32]));
        (SqliteCredentialStore::new(pool, vault), dir)
    }

    fn user(raw: &str) -> UserId {
        UserId::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_link_and_read_back() {
        let (store, _dir) = test_store().await;
        let u = user("user-1");

        store.link(&u, "sk_live_abc", Some("wt_xyz")).await.unwrap();

        assert_eq!(store.api_key(&u).await.unwrap().unwrap().expose(), "sk_live_abc");
        assert_eq!(store.web_token(&u).await.unwrap().unwrap().expose(), "wt_xyz");

        let record = store.record(&u).await.unwrap().unwrap();
        assert!(record.has_web_token);
        assert!(record.assistant_id.is_none());
    }

    #[tokio::test]
    async fn test_secrets_are_encrypted_at_rest() {
        let (store, _dir) = test_store().await;
        let u = user("user-1");
        store.link(&u, "sk_live_abc", None).await.unwrap();

        let (raw,): (Vec<u8>,) =
            sqlx::query_as("SELECT api_key FROM credentials WHERE user_id = ?")
                .bind("user-1")
                .fetch_one(&store.pool().reader)
                .await
                .unwrap();

        assert!(!raw.windows(7).any(|w| w == b"sk_live"));
        assert!(raw.len() > 12);
    }

    #[tokio::test]
    async fn test_unknown_user_reads_none() {
        let (store, _dir) = test_store().await;
        let u = user("ghost");
        assert!(store.api_key(&u).await.unwrap().is_none());
        assert!(store.web_token(&u).await.unwrap().is_none());
        assert!(store.record(&u).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_relink_keeps_clone_ids() {
        let (store, _dir) = test_store().await;
        let u = user("user-1");
        store.link(&u, "sk_old", Some("wt")).await.unwrap();
        store.save_clone_ids(&u, "A1", "T1").await.unwrap();

        store.link(&u, "sk_new", None).await.unwrap();

        assert_eq!(store.api_key(&u).await.unwrap().unwrap().expose(), "sk_new");
        assert!(store.web_token(&u).await.unwrap().is_none());
        let record = store.record(&u).await.unwrap().unwrap();
        assert_eq!(record.assistant_id.as_deref(), Some("A1"));
        assert_eq!(record.tool_id.as_deref(), Some("T1"));
        assert!(!record.has_web_token);
    }

    #[tokio::test]
    async fn test_save_clone_ids_requires_link() {
        let (store, _dir) = test_store().await;
        let result = store.save_clone_ids(&user("ghost"), "A1", "T1").await;
        assert!(matches!(result, Err(CredentialError::NotLinked)));
    }

    #[tokio::test]
    async fn test_unlink() {
        let (store, _dir) = test_store().await;
        let u = user("user-1");
        store.link(&u, "sk", None).await.unwrap();

        store.unlink(&u).await.unwrap();

        assert!(store.record(&u).await.unwrap().is_none());
        assert!(matches!(store.unlink(&u).await, Err(CredentialError::NotLinked)));
    }

    #[tokio::test]
    async fn test_wrong_vault_key_is_crypto_error() {
        let (store, _dir) = test_store().await;
        let u = user("user-1");
        store.link(&u, "sk_live", None).await.unwrap();

        let other = SqliteCredentialStore::new(
            store.pool().clone(),
            Arc::new(VaultCrypto::new(&[1u8; 32])),
        );
        assert!(matches!(other.api_key(&u).await, Err(CredentialError::Crypto)));
    }
}
