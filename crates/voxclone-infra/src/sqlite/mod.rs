//! SQLite storage layer.
//!
//! WAL-mode database with split read/write pools, and the credential store
//! built on it.

pub mod credential;
pub mod pool;
