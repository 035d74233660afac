//! Managed transaction-update worker.
//!
//! Consumes the commerce store's live transaction-update feed on a dedicated
//! background task. Events are processed strictly one at a time, preserving
//! the feed's per-transaction ordering. Verification failures are logged and
//! skipped; the worker survives them and moves on to the next event.

use std::future::Future;
use std::sync::{Arc, Mutex};

use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::domain::{SubscriptionError, Transaction, TransactionVerifier};
use crate::ports::CommerceStore;

/// Long-lived subscription to the transaction-update feed.
///
/// At most one worker is live at a time: starting while a worker is active
/// silently replaces it (the previous task is aborted first). Stopping is
/// final for that worker; a new one can be started afterwards.
pub struct TransactionListener {
    store: Arc<dyn CommerceStore>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl TransactionListener {
    /// Creates a listener over the given commerce store. No task is spawned
    /// until [`start`](Self::start).
    pub fn new(store: Arc<dyn CommerceStore>) -> Self {
        Self {
            store,
            worker: Mutex::new(None),
        }
    }

    /// Spawns the worker task.
    ///
    /// For each event: the envelope must verify (unverifiable events are
    /// logged and skipped), then the transaction is acknowledged when
    /// `acknowledge` is set, then `handler` runs with the verified
    /// transaction. Replaces any previously started worker.
    pub fn start<F, Fut>(&self, acknowledge: bool, handler: F)
    where
        F: Fn(Transaction) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut updates = self.store.transaction_updates();
        let store = self.store.clone();

        let handle = tokio::spawn(async move {
            while let Some(envelope) = updates.next().await {
                let transaction = match TransactionVerifier::require_verified(envelope) {
                    Ok(transaction) => transaction,
                    Err(failure) => {
                        let error = SubscriptionError::from(failure);
                        tracing::warn!(
                            user_message = error.user_message(),
                            "Skipping unverifiable transaction update: {}",
                            error
                        );
                        continue;
                    }
                };
                if acknowledge {
                    store.acknowledge(&transaction).await;
                }
                handler(transaction).await;
            }
            tracing::debug!("Transaction update feed ended");
        });

        let mut slot = self
            .worker
            .lock()
            .expect("TransactionListener: lock poisoned");
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    /// Cancels the worker. Final for that worker; no-op when none is active.
    pub fn stop(&self) {
        let mut slot = self
            .worker
            .lock()
            .expect("TransactionListener: lock poisoned");
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }

    /// Returns true while a worker task is live.
    pub fn is_active(&self) -> bool {
        self.worker
            .lock()
            .expect("TransactionListener: lock poisoned")
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for TransactionListener {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::MockCommerceStore;
    use crate::domain::{ProductType, VerificationFailure, VerificationResult};
    use std::time::Duration;

    fn transaction(id: u64) -> Transaction {
        Transaction {
            id,
            product_id: "com.month".to_string(),
            quantity: 1,
            revocation_date: None,
            is_upgraded: false,
            product_type: ProductType::AutoRenewable,
        }
    }

    fn collector() -> (Arc<Mutex<Vec<u64>>>, impl Fn(Transaction) -> futures::future::Ready<()>)
    {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handler = move |tx: Transaction| {
            sink.lock().unwrap().push(tx.id);
            futures::future::ready(())
        };
        (seen, handler)
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn verification_failure_skips_event_but_keeps_listening() {
        let mock = Arc::new(MockCommerceStore::new());
        let listener = TransactionListener::new(mock.clone());
        let (seen, handler) = collector();

        listener.start(false, handler);
        mock.push_update(VerificationResult::Unverified(
            transaction(1),
            VerificationFailure::InvalidSignature,
        ));
        mock.push_update(VerificationResult::Verified(transaction(2)));
        settle().await;

        assert_eq!(*seen.lock().unwrap(), vec![2]);
        assert!(listener.is_active());
    }

    #[tokio::test]
    async fn acknowledges_before_invoking_handler_when_asked() {
        let mock = Arc::new(MockCommerceStore::new());
        let listener = TransactionListener::new(mock.clone());
        let (seen, handler) = collector();

        listener.start(true, handler);
        mock.push_update(VerificationResult::Verified(transaction(7)));
        settle().await;

        assert_eq!(mock.acknowledged(), vec![7]);
        assert_eq!(*seen.lock().unwrap(), vec![7]);
    }

    #[tokio::test]
    async fn does_not_acknowledge_when_deferred() {
        let mock = Arc::new(MockCommerceStore::new());
        let listener = TransactionListener::new(mock.clone());
        let (_, handler) = collector();

        listener.start(false, handler);
        mock.push_update(VerificationResult::Verified(transaction(7)));
        settle().await;

        assert!(mock.acknowledged().is_empty());
    }

    #[tokio::test]
    async fn restart_replaces_the_previous_worker() {
        let mock = Arc::new(MockCommerceStore::new());
        let listener = TransactionListener::new(mock.clone());
        let (first_seen, first_handler) = collector();
        let (second_seen, second_handler) = collector();

        listener.start(false, first_handler);
        listener.start(false, second_handler);
        settle().await;
        mock.push_update(VerificationResult::Verified(transaction(3)));
        settle().await;

        assert!(first_seen.lock().unwrap().is_empty());
        assert_eq!(*second_seen.lock().unwrap(), vec![3]);
    }

    #[tokio::test]
    async fn stop_is_final_for_the_worker() {
        let mock = Arc::new(MockCommerceStore::new());
        let listener = TransactionListener::new(mock.clone());
        let (seen, handler) = collector();

        listener.start(false, handler);
        listener.stop();
        settle().await;
        mock.push_update(VerificationResult::Verified(transaction(9)));
        settle().await;

        assert!(seen.lock().unwrap().is_empty());
        assert!(!listener.is_active());
    }

    #[tokio::test]
    async fn events_are_processed_in_feed_order() {
        let mock = Arc::new(MockCommerceStore::new());
        let listener = TransactionListener::new(mock.clone());
        let (seen, handler) = collector();

        listener.start(false, handler);
        for id in 1..=5 {
            mock.push_update(VerificationResult::Verified(transaction(id)));
        }
        settle().await;

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3, 4, 5]);
    }
}
