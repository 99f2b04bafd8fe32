//! Business logic services (use cases).
//!
//! Services depend on the port traits in `platform` and `repository`, never
//! on concrete infrastructure.

pub mod reconcile;
pub mod replication;
