//! Observability for voxclone: tracing subscriber setup and the span
//! attribute names shared by the platform client and the services.

pub mod attrs;
pub mod tracing_setup;
