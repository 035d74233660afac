//! Application services - wiring the domain to the ports.
//!
//! # Module Structure
//!
//! - `entitlement_store` - typed entitlement cache with change notification
//! - `catalog` - product catalog cache
//! - `resolver` - the core entitlement resolution algorithm
//! - `listener` - managed transaction-update worker
//! - `manager` - dependency-injected facade for the embedding application

mod catalog;
mod entitlement_store;
mod listener;
mod manager;
mod resolver;

pub use catalog::ProductCatalog;
pub use entitlement_store::{EntitlementChanged, EntitlementStore};
pub use listener::TransactionListener;
pub use manager::SubscriptionManager;
pub use resolver::SubscriptionResolver;
