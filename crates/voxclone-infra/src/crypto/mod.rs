//! Cryptographic operations for voxclone.
//!
//! - `vault`: AES-256-GCM encryption for platform credentials at rest

pub mod vault;
