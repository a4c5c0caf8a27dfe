//! Auth types shared across NeuraRig crates.
//!
//! Provides JWT issuance/validation and the bearer-token `Identity` extractor.

pub mod identity;
pub mod token;
