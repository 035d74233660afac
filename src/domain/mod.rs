//! Subscription entitlement domain module.
//!
//! Pure types and logic for entitlement resolution.
//!
//! # Module Structure
//!
//! - `tier` - SubscriptionTier catalog products
//! - `status` - SubscriptionStatus query result and DevelopmentOverride
//! - `transaction` - Transaction records and the verification envelope
//! - `product` - Catalog product snapshot
//! - `verifier` - TransactionVerifier unwrap policies
//! - `purchase` - Transient successful-purchase result
//! - `errors` - SubscriptionError taxonomy

mod errors;
mod product;
mod purchase;
mod status;
mod tier;
mod transaction;
mod verifier;

pub use errors::SubscriptionError;
pub use product::Product;
pub use purchase::Purchase;
pub use status::{DevelopmentOverride, SubscriptionStatus};
pub use tier::SubscriptionTier;
pub use transaction::{ProductType, Transaction, VerificationFailure, VerificationResult};
pub use verifier::TransactionVerifier;
