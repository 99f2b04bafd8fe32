//! HTTP request handlers for the REST API.

pub mod clone;
pub mod credential;
