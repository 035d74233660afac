//! Commerce store port for platform purchase operations.
//!
//! Defines the contract for the platform's commerce store: product catalog
//! lookup, purchase initiation, entitlement snapshots, the live
//! transaction-update feed, acknowledgment, and restore sync. Receipt
//! cryptography happens behind this boundary; the engine only ever sees
//! [`VerificationResult`] envelopes.

use std::collections::HashSet;

use async_trait::async_trait;
use futures::stream::BoxStream;
use uuid::Uuid;

use crate::domain::{Product, SubscriptionError, Transaction, VerificationResult};

/// A stream of transaction envelopes from the platform.
pub type TransactionStream = BoxStream<'static, VerificationResult<Transaction>>;

/// Tri-state outcome of a purchase call that reached the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    /// The purchase completed; the resulting transaction envelope is
    /// attached.
    Success(VerificationResult<Transaction>),

    /// The user cancelled the purchase flow.
    UserCancelled,

    /// The purchase is awaiting external approval (e.g. ask-to-buy).
    Pending,
}

/// Port for the platform commerce store.
///
/// Implementations perform the actual platform I/O. All operations may
/// suspend; callers layer their own timeouts if needed.
#[async_trait]
pub trait CommerceStore: Send + Sync {
    /// Fetch catalog products for the given identifier set.
    ///
    /// Fails with [`SubscriptionError::StoreUnavailable`] when the store
    /// cannot be reached.
    async fn fetch_products(
        &self,
        ids: &HashSet<String>,
    ) -> Result<Vec<Product>, SubscriptionError>;

    /// Initiate a purchase of `product`.
    ///
    /// `account_token` scopes the purchase to an application account where
    /// supported. A platform-level failure (as opposed to a cancelled or
    /// pending outcome) is returned as an error.
    async fn purchase(
        &self,
        product: &Product,
        quantity: u32,
        account_token: Option<Uuid>,
    ) -> Result<PurchaseOutcome, SubscriptionError>;

    /// Snapshot of the user's current entitlements. The stream is finite;
    /// each call yields a fresh snapshot.
    async fn current_entitlements(&self) -> TransactionStream;

    /// Live feed of transaction updates. Unbounded; yields for the life of
    /// the subscription.
    fn transaction_updates(&self) -> TransactionStream;

    /// Acknowledge ("finish") a transaction, signalling the platform that it
    /// has been fully processed and stopping redelivery. Idempotent on the
    /// platform side.
    async fn acknowledge(&self, transaction: &Transaction);

    /// Ask the platform to sync restored purchases into the entitlement
    /// snapshot.
    async fn sync_restored_purchases(&self) -> Result<(), SubscriptionError>;

    /// Open the platform's manage-subscriptions UI.
    async fn open_manage_subscriptions(&self) -> Result<(), SubscriptionError>;
}
