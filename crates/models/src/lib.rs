//! Resource entities and their validation/serialization contracts.
//!
//! Entities double as sea-orm models for the relational backend and know how
//! to round-trip through the text-only representation used by key-value
//! stores. Every read path revalidates; stored data is never trusted.

pub mod errors;
pub mod db;
pub mod pet;
pub mod counter;

pub use errors::ModelError;
