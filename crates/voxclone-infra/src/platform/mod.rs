//! Voice platform adapter.
//!
//! `client::VapiClient` implements the core `PlatformApi` port over HTTP;
//! `client::VapiConnector` builds one per decrypted API key.

pub mod client;

pub use client::{VapiClient, VapiConnector};
