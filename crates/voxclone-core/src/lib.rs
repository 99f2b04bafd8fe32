//! Reconciliation engine and port traits for voxclone.
//!
//! This crate defines the ports (`platform::PlatformApi`,
//! `repository::credential::CredentialStore`) that the infrastructure layer
//! implements, plus the pure logic on top of them: version suffix handling,
//! payload sanitization and the clone orchestrator. It never depends on
//! `voxclone-infra` or any HTTP/database crate.

pub mod platform;
pub mod repository;
pub mod sanitize;
pub mod service;
pub mod version;

#[cfg(test)]
pub(crate) mod testing;
