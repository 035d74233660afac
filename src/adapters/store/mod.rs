//! Commerce store adapters.
//!
//! The real platform store lives behind the `CommerceStore` port in the
//! embedding application; this module provides the configurable test double.

mod mock_commerce_store;

pub use mock_commerce_store::MockCommerceStore;
