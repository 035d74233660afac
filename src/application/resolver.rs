//! Core entitlement resolution.
//!
//! Reconciles the commerce store's current-entitlement snapshot with the
//! product catalog into one authoritative `{is_premium, current_tier}` pair
//! in the entitlement cache. Resolution always yields a definite boolean:
//! any failure along the way is logged and forces the cached state to
//! non-premium rather than propagating to the caller.

use std::sync::Arc;

use futures::StreamExt;

use crate::application::catalog::ProductCatalog;
use crate::application::entitlement_store::EntitlementStore;
use crate::domain::{
    ProductType, SubscriptionError, SubscriptionTier, Transaction, TransactionVerifier,
};
use crate::ports::CommerceStore;

/// Computes the authoritative subscription status and writes it to the
/// entitlement cache.
///
/// Concurrent resolutions are last-writer-wins: every write is a complete
/// `{is_premium, current_tier}` pair, so races can only cause a transient
/// flicker, never a half-updated state.
pub struct SubscriptionResolver {
    store: Arc<dyn CommerceStore>,
    catalog: Arc<ProductCatalog>,
    entitlements: Arc<EntitlementStore>,
}

impl SubscriptionResolver {
    /// Creates a resolver over the given collaborators.
    pub fn new(
        store: Arc<dyn CommerceStore>,
        catalog: Arc<ProductCatalog>,
        entitlements: Arc<EntitlementStore>,
    ) -> Self {
        Self {
            store,
            catalog,
            entitlements,
        }
    }

    /// Resolves the current entitlement status. Returns true when the user
    /// holds a valid paid entitlement.
    ///
    /// Never fails: errors are absorbed here, logged, and the cached state
    /// is forced to non-premium so the answer stays definite.
    pub async fn resolve_status(&self) -> bool {
        self.resolve_with(true).await
    }

    /// Resolves with an explicit renewability policy. `renewable = false`
    /// additionally admits non-renewing subscriptions into the candidate
    /// set.
    pub async fn resolve_with(&self, renewable: bool) -> bool {
        match self.try_resolve(renewable).await {
            Ok(entitled) => entitled,
            Err(e) => {
                tracing::warn!("Entitlement resolution failed, forcing non-premium: {}", e);
                self.entitlements.set_entitlement(false, None);
                false
            }
        }
    }

    async fn try_resolve(&self, renewable: bool) -> Result<bool, SubscriptionError> {
        let transactions = self.current_entitlements(renewable).await;

        // The snapshot's enumeration order is trusted; the first transaction
        // is the candidate. A known simplification: no recency ordering is
        // imposed when several non-lifetime entitlements coexist.
        let candidate = match transactions.first() {
            Some(candidate) => candidate,
            None => {
                self.entitlements.set_entitlement(false, None);
                return Ok(false);
            }
        };

        let products = self.catalog.load_all_tiers().await?;

        if candidate.is_active() {
            let tier = products
                .iter()
                .find(|p| p.id == candidate.product_id)
                .and_then(|p| SubscriptionTier::from_product_id(&p.id));
            if let Some(tier) = tier {
                self.entitlements.set_entitlement(true, Some(tier));
                return Ok(true);
            }
        }

        self.entitlements.set_entitlement(false, None);
        Ok(false)
    }

    /// Collects the entitlement snapshot, keeping only transactions the
    /// renewability policy admits: the lifetime product, auto-renewable
    /// subscriptions, and (when `renewable` is false) non-renewing ones.
    async fn current_entitlements(&self, renewable: bool) -> Vec<Transaction> {
        let mut snapshot = self.store.current_entitlements().await;
        let mut transactions = Vec::new();

        while let Some(envelope) = snapshot.next().await {
            // Lenient policy: unverified envelopes still count toward
            // entitlement; rejection is the listener's concern.
            let transaction = TransactionVerifier::unwrap(envelope);

            let admitted = transaction.product_id == SubscriptionTier::LifeTime.product_id()
                || transaction.product_type == ProductType::AutoRenewable
                || (!renewable && transaction.product_type == ProductType::NonRenewable);
            if admitted {
                transactions.push(transaction);
            }
        }

        transactions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryPreferenceStore;
    use crate::adapters::store::MockCommerceStore;
    use crate::domain::{Product, VerificationFailure, VerificationResult};
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn transaction(id: u64, product_id: &str, product_type: ProductType) -> Transaction {
        Transaction {
            id,
            product_id: product_id.to_string(),
            quantity: 1,
            revocation_date: None,
            is_upgraded: false,
            product_type,
        }
    }

    fn full_catalog(mock: &MockCommerceStore) {
        for tier in SubscriptionTier::ALL {
            let product_type = if tier.is_lifetime() {
                ProductType::NonConsumable
            } else {
                ProductType::AutoRenewable
            };
            mock.add_product(Product {
                id: tier.product_id().to_string(),
                display_name: tier.display_name().to_string(),
                display_price: "$9.99".to_string(),
                product_type,
            });
        }
    }

    struct Fixture {
        mock: Arc<MockCommerceStore>,
        entitlements: Arc<EntitlementStore>,
        resolver: SubscriptionResolver,
    }

    fn fixture() -> Fixture {
        let mock = Arc::new(MockCommerceStore::new());
        full_catalog(&mock);
        let catalog = Arc::new(ProductCatalog::new(mock.clone()));
        let entitlements = Arc::new(EntitlementStore::new(Arc::new(
            InMemoryPreferenceStore::new(),
        )));
        let resolver =
            SubscriptionResolver::new(mock.clone(), catalog, entitlements.clone());
        Fixture {
            mock,
            entitlements,
            resolver,
        }
    }

    #[tokio::test]
    async fn lifetime_entitlement_resolves_true_with_lifetime_tier() {
        let f = fixture();
        f.mock.set_entitlements(vec![VerificationResult::Verified(transaction(
            1,
            "com.lifetime",
            ProductType::NonConsumable,
        ))]);

        assert!(f.resolver.resolve_status().await);
        assert!(f.entitlements.is_premium());
        assert_eq!(f.entitlements.current_tier(), Some(SubscriptionTier::LifeTime));
    }

    #[tokio::test]
    async fn empty_snapshot_resolves_false_and_clears_tier() {
        let f = fixture();
        f.entitlements.set_entitlement(true, Some(SubscriptionTier::Month));

        assert!(!f.resolver.resolve_status().await);
        assert!(!f.entitlements.is_premium());
        assert_eq!(f.entitlements.current_tier(), None);
    }

    #[tokio::test]
    async fn revoked_transaction_never_entitles() {
        let f = fixture();
        let mut revoked = transaction(1, "com.month", ProductType::AutoRenewable);
        revoked.revocation_date = Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        f.mock
            .set_entitlements(vec![VerificationResult::Verified(revoked)]);

        assert!(!f.resolver.resolve_status().await);
        assert_eq!(f.entitlements.current_tier(), None);
    }

    #[tokio::test]
    async fn upgraded_transaction_never_entitles() {
        let f = fixture();
        let mut upgraded = transaction(1, "com.month", ProductType::AutoRenewable);
        upgraded.is_upgraded = true;
        f.mock
            .set_entitlements(vec![VerificationResult::Verified(upgraded)]);

        assert!(!f.resolver.resolve_status().await);
    }

    #[tokio::test]
    async fn unverified_envelope_still_counts() {
        let f = fixture();
        f.mock.set_entitlements(vec![VerificationResult::Unverified(
            transaction(1, "com.year", ProductType::AutoRenewable),
            VerificationFailure::InvalidSignature,
        )]);

        assert!(f.resolver.resolve_status().await);
        assert_eq!(f.entitlements.current_tier(), Some(SubscriptionTier::Year));
    }

    #[tokio::test]
    async fn consumable_transactions_are_filtered_out() {
        let f = fixture();
        f.mock.set_entitlements(vec![VerificationResult::Verified(transaction(
            1,
            "com.month",
            ProductType::Consumable,
        ))]);

        assert!(!f.resolver.resolve_status().await);
    }

    #[tokio::test]
    async fn non_renewable_admitted_only_when_requested() {
        let f = fixture();
        f.mock.set_entitlements(vec![VerificationResult::Verified(transaction(
            1,
            "com.week",
            ProductType::NonRenewable,
        ))]);

        assert!(!f.resolver.resolve_with(true).await);
        assert!(f.resolver.resolve_with(false).await);
        assert_eq!(f.entitlements.current_tier(), Some(SubscriptionTier::Week));
    }

    #[tokio::test]
    async fn unknown_product_resolves_false() {
        let f = fixture();
        f.mock.set_entitlements(vec![VerificationResult::Verified(transaction(
            1,
            "com.mystery",
            ProductType::AutoRenewable,
        ))]);

        assert!(!f.resolver.resolve_status().await);
    }

    #[tokio::test]
    async fn catalog_failure_is_absorbed_and_forces_non_premium() {
        let f = fixture();
        f.entitlements.set_entitlement(true, Some(SubscriptionTier::Year));
        f.mock.set_entitlements(vec![VerificationResult::Verified(transaction(
            1,
            "com.year",
            ProductType::AutoRenewable,
        ))]);
        f.mock
            .set_fetch_error(Some(SubscriptionError::StoreUnavailable("down".into())));

        assert!(!f.resolver.resolve_status().await);
        assert!(!f.entitlements.is_premium());
        assert_eq!(f.entitlements.current_tier(), None);
    }

    #[tokio::test]
    async fn repeat_resolution_is_idempotent_and_notifies_once() {
        let f = fixture();
        f.mock.set_entitlements(vec![VerificationResult::Verified(transaction(
            1,
            "com.month",
            ProductType::AutoRenewable,
        ))]);
        let mut rx = f.entitlements.subscribe();

        assert!(f.resolver.resolve_status().await);
        assert!(f.resolver.resolve_status().await);

        assert!(rx.try_recv().is_ok());
        // Second resolution changed nothing, so no second notification.
        assert!(rx.try_recv().is_err());
    }

    fn arbitrary_product_type() -> impl Strategy<Value = ProductType> {
        prop_oneof![
            Just(ProductType::AutoRenewable),
            Just(ProductType::NonRenewable),
            Just(ProductType::NonConsumable),
            Just(ProductType::Consumable),
        ]
    }

    fn revoked_transaction() -> impl Strategy<Value = Transaction> {
        (
            1u64..1000,
            prop_oneof![
                Just("com.month".to_string()),
                Just("com.year".to_string()),
                Just("com.week".to_string()),
                Just("com.lifetime".to_string()),
            ],
            1u32..5,
            arbitrary_product_type(),
            any::<bool>(),
        )
            .prop_map(|(id, product_id, quantity, product_type, is_upgraded)| Transaction {
                id,
                product_id,
                quantity,
                revocation_date: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
                is_upgraded,
                product_type,
            })
    }

    proptest! {
        #[test]
        fn snapshots_of_revoked_transactions_never_entitle(
            transactions in proptest::collection::vec(revoked_transaction(), 0..8)
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            rt.block_on(async {
                let f = fixture();
                f.mock.set_entitlements(
                    transactions.into_iter().map(VerificationResult::Verified).collect(),
                );

                prop_assert!(!f.resolver.resolve_status().await);
                prop_assert!(!f.entitlements.is_premium());
                prop_assert_eq!(f.entitlements.current_tier(), None);
                Ok(())
            })?;
        }
    }
}
