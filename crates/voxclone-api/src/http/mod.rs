//! HTTP/REST API layer for voxclone.
//!
//! Axum-based REST API at `/api/v1/`. Credential endpoints answer in the
//! envelope format; the clone endpoint answers with the clone contract
//! (`{ assistantId, toolId, actions }` or `{ code, message, actions }`).

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
