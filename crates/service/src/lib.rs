//! Resource lifecycle on top of interchangeable stores.
//! - `storage`: key-value adapters and backend selection by URI.
//! - `pets` / `counters`: a repository per backend family and the service
//!   that owns validation, existence and conflict rules.
//! - `backend`: wires both services to one connected store.

pub mod backend;
pub mod counters;
pub mod errors;
pub mod pets;
pub mod storage;
#[cfg(test)]
pub mod test_support;

pub use backend::Services;
pub use errors::ServiceError;
