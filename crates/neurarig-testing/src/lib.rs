//! Test utilities for NeuraRig services.
//!
//! Provides `MockAuth` and the fixture loader.
//! Import in `#[cfg(test)]` blocks and `tests/` only, never in production code.

pub mod auth;
pub mod fixture;
