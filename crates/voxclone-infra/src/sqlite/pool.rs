//! Database pool with split reader/writer connections in WAL mode.
//!
//! SQLite allows only one writer at a time, so `DatabasePool` keeps a
//! multi-connection reader pool and a single-connection writer pool. The
//! pool is an explicit handle: callers `open` it, pass it to the stores that
//! need it, and `close` it on shutdown. Nothing is held in process-wide state.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

/// File name of the credential database inside the data directory.
pub const DATABASE_FILE_NAME: &str = "voxclone.db";

/// Split read/write pool for SQLite with WAL mode.
///
/// - `reader`: up to 8 connections for SELECT queries.
/// - `writer`: one connection for INSERT/UPDATE/DELETE.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open both pools and run pending migrations on the writer.
    pub async fn open(database_url: &str) -> Result<Self, sqlx::Error> {
        let base_opts = SqliteConnectOptions::from_str(database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(base_opts.clone())
            .await?;

        // Migrate before the read-only pool sees the file.
        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(base_opts.read_only(true))
            .await?;

        tracing::debug!(url = database_url, "Database pool opened");
        Ok(Self { reader, writer })
    }

    /// Open the database file inside `data_dir`, creating the directory.
    pub async fn open_in(data_dir: &Path) -> Result<Self, sqlx::Error> {
        std::fs::create_dir_all(data_dir)?;
        Self::open(&database_url(data_dir)).await
    }

    /// Close both pools, waiting for in-flight queries to finish.
    pub async fn close(&self) {
        self.reader.close().await;
        self.writer.close().await;
        tracing::debug!("Database pool closed");
    }

    pub fn is_closed(&self) -> bool {
        self.reader.is_closed() && self.writer.is_closed()
    }
}

/// `sqlite://` URL of the credential database in `data_dir`.
pub fn database_url(data_dir: &Path) -> String {
    format!("sqlite://{}", data_dir.join(DATABASE_FILE_NAME).display())
}
