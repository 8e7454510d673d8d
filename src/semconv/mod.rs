//! Semantic convention attribute keys.
//!
//! The subset of the OpenTelemetry semantic conventions this crate emits,
//! split the way the upstream registry is: span attributes under
//! [`trace`], process-level attributes under [`resource`].

pub mod resource;
pub mod trace;
