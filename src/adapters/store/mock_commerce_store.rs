//! Mock commerce store for testing.
//!
//! Provides a configurable implementation of `CommerceStore` for unit and
//! integration tests. Supports:
//! - Pre-configured catalog products and entitlement snapshots
//! - Purchase outcome priming
//! - Per-method error injection
//! - Call tracking and acknowledgment assertions
//! - A live update feed driven by the test

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::domain::{Product, SubscriptionError, Transaction, VerificationResult};
use crate::ports::{CommerceStore, PurchaseOutcome, TransactionStream};

/// Mock commerce store for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockCommerceStore::new();
/// mock.add_product(product);
/// mock.set_entitlements(vec![VerificationResult::Verified(transaction)]);
///
/// let outcome = mock.purchase(&product, 1, None).await?;
/// assert_eq!(mock.calls(), vec!["purchase"]);
/// ```
#[derive(Default)]
pub struct MockCommerceStore {
    inner: Arc<Mutex<MockState>>,
    next_transaction_id: AtomicU64,
}

#[derive(Default)]
struct MockState {
    /// Catalog products returned by `fetch_products`, filtered to the
    /// requested id set.
    products: Vec<Product>,

    /// Current entitlement snapshot, replayed on every call.
    entitlements: Vec<VerificationResult<Transaction>>,

    /// Outcome to return from the next `purchase` call.
    next_purchase_outcome: Option<PurchaseOutcome>,

    /// Injected errors, one slot per fallible method.
    fetch_error: Option<SubscriptionError>,
    purchase_error: Option<SubscriptionError>,
    sync_error: Option<SubscriptionError>,
    manage_error: Option<SubscriptionError>,

    /// Live-feed senders, one per `transaction_updates` subscriber.
    update_senders: Vec<mpsc::UnboundedSender<VerificationResult<Transaction>>>,

    /// Ids acknowledged via `acknowledge`, in call order.
    acknowledged: Vec<u64>,

    /// Method names, in call order.
    calls: Vec<&'static str>,
}

impl MockCommerceStore {
    /// Creates a mock with an empty catalog and no entitlements.
    pub fn new() -> Self {
        Self {
            inner: Arc::default(),
            next_transaction_id: AtomicU64::new(1),
        }
    }

    // === Configuration ===

    /// Adds a product to the catalog.
    pub fn add_product(&self, product: Product) {
        self.inner.lock().unwrap().products.push(product);
    }

    /// Replaces the entitlement snapshot.
    pub fn set_entitlements(&self, entitlements: Vec<VerificationResult<Transaction>>) {
        self.inner.lock().unwrap().entitlements = entitlements;
    }

    /// Sets the outcome of the next `purchase` call.
    pub fn set_purchase_outcome(&self, outcome: PurchaseOutcome) {
        self.inner.lock().unwrap().next_purchase_outcome = Some(outcome);
    }

    /// Makes `fetch_products` fail with the given error until cleared.
    pub fn set_fetch_error(&self, error: Option<SubscriptionError>) {
        self.inner.lock().unwrap().fetch_error = error;
    }

    /// Makes `purchase` fail with the given error until cleared.
    pub fn set_purchase_error(&self, error: Option<SubscriptionError>) {
        self.inner.lock().unwrap().purchase_error = error;
    }

    /// Makes `sync_restored_purchases` fail with the given error until
    /// cleared.
    pub fn set_sync_error(&self, error: Option<SubscriptionError>) {
        self.inner.lock().unwrap().sync_error = error;
    }

    /// Makes `open_manage_subscriptions` fail with the given error until
    /// cleared.
    pub fn set_manage_error(&self, error: Option<SubscriptionError>) {
        self.inner.lock().unwrap().manage_error = error;
    }

    /// Pushes an event into every live `transaction_updates` stream.
    pub fn push_update(&self, event: VerificationResult<Transaction>) {
        let mut state = self.inner.lock().unwrap();
        state.update_senders.retain(|tx| tx.send(event.clone()).is_ok());
    }

    // === Assertions ===

    /// Method names recorded so far, in call order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Transaction ids acknowledged so far, in call order.
    pub fn acknowledged(&self) -> Vec<u64> {
        self.inner.lock().unwrap().acknowledged.clone()
    }

    /// Number of `fetch_products` calls recorded.
    pub fn fetch_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| **c == "fetch_products")
            .count()
    }

    fn record(&self, method: &'static str) {
        self.inner.lock().unwrap().calls.push(method);
    }

    fn fabricate_transaction(&self, product: &Product, quantity: u32) -> Transaction {
        Transaction {
            id: self.next_transaction_id.fetch_add(1, Ordering::Relaxed),
            product_id: product.id.clone(),
            quantity,
            revocation_date: None,
            is_upgraded: false,
            product_type: product.product_type,
        }
    }
}

#[async_trait]
impl CommerceStore for MockCommerceStore {
    async fn fetch_products(
        &self,
        ids: &HashSet<String>,
    ) -> Result<Vec<Product>, SubscriptionError> {
        self.record("fetch_products");
        let state = self.inner.lock().unwrap();
        if let Some(error) = &state.fetch_error {
            return Err(error.clone());
        }
        Ok(state
            .products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn purchase(
        &self,
        product: &Product,
        quantity: u32,
        _account_token: Option<Uuid>,
    ) -> Result<PurchaseOutcome, SubscriptionError> {
        self.record("purchase");
        let primed = {
            let mut state = self.inner.lock().unwrap();
            if let Some(error) = &state.purchase_error {
                return Err(error.clone());
            }
            state.next_purchase_outcome.take()
        };
        // With nothing primed, succeed with a fabricated verified transaction.
        Ok(primed.unwrap_or_else(|| {
            PurchaseOutcome::Success(VerificationResult::Verified(
                self.fabricate_transaction(product, quantity),
            ))
        }))
    }

    async fn current_entitlements(&self) -> TransactionStream {
        self.record("current_entitlements");
        let snapshot = self.inner.lock().unwrap().entitlements.clone();
        stream::iter(snapshot).boxed()
    }

    fn transaction_updates(&self) -> TransactionStream {
        self.record("transaction_updates");
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.lock().unwrap().update_senders.push(tx);
        stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        })
        .boxed()
    }

    async fn acknowledge(&self, transaction: &Transaction) {
        self.record("acknowledge");
        self.inner.lock().unwrap().acknowledged.push(transaction.id);
    }

    async fn sync_restored_purchases(&self) -> Result<(), SubscriptionError> {
        self.record("sync_restored_purchases");
        match &self.inner.lock().unwrap().sync_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn open_manage_subscriptions(&self) -> Result<(), SubscriptionError> {
        self.record("open_manage_subscriptions");
        match &self.inner.lock().unwrap().manage_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}
