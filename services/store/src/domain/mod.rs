pub mod builder;
pub mod repository;
pub mod types;
