//! Shared domain types for voxclone.
//!
//! Resources (tools and assistants), the action log, user credentials
//! metadata, the clone request/response contract, configuration, and the
//! error types shared by every layer.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod action;
pub mod clone;
pub mod config;
pub mod credential;
pub mod error;
pub mod resource;
