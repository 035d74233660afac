//! Adapters - concrete implementations of the ports.
//!
//! - `storage` - preference store adapters (in-memory, JSON file)
//! - `store` - commerce store test double

pub mod storage;
pub mod store;
