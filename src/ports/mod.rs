//! Ports - contracts between the entitlement engine and its collaborators.
//!
//! Following hexagonal architecture, these traits define what the engine
//! needs from the outside world without binding to a concrete platform:
//!
//! - `commerce_store` - the platform's commerce store (catalog, purchases,
//!   entitlement and update streams)
//! - `preference_store` - the local key-value persistence substrate

mod commerce_store;
mod preference_store;

pub use commerce_store::{CommerceStore, PurchaseOutcome, TransactionStream};
pub use preference_store::PreferenceStore;
