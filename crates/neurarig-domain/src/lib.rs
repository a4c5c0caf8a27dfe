//! Domain types shared across NeuraRig crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; `handlers/` may use them for
//! request/response DTOs.

pub mod catalog;
pub mod order;
pub mod pagination;
pub mod slug;
pub mod user;
