//! HTTP plumbing shared by NeuraRig binaries: health, request ids, tracing,
//! and wire-format serde helpers.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
