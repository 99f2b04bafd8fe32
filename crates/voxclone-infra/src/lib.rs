//! Infrastructure layer for voxclone.
//!
//! Implements the ports defined in `voxclone-core`: the HTTP platform
//! client, the encrypted SQLite credential store, plus configuration and
//! template loading from the data directory.

pub mod config;
pub mod crypto;
pub mod platform;
pub mod sqlite;
pub mod template;
