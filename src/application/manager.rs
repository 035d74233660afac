//! Subscription manager facade.
//!
//! The single entry point the embedding application talks to. Constructed
//! explicitly by the composition root with its collaborators injected; the
//! application decides its lifetime (typically process-wide) rather than the
//! type itself.

use std::sync::Arc;

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::application::catalog::ProductCatalog;
use crate::application::entitlement_store::{EntitlementChanged, EntitlementStore};
use crate::application::listener::TransactionListener;
use crate::application::resolver::SubscriptionResolver;
use crate::config::EntitlementConfig;
use crate::domain::{
    DevelopmentOverride, Product, Purchase, SubscriptionError, SubscriptionStatus,
    SubscriptionTier, TransactionVerifier,
};
use crate::ports::{CommerceStore, PreferenceStore, PurchaseOutcome};

/// Drives purchase, restore, and status queries against the commerce store,
/// keeping the entitlement cache authoritative.
pub struct SubscriptionManager {
    store: Arc<dyn CommerceStore>,
    catalog: Arc<ProductCatalog>,
    entitlements: Arc<EntitlementStore>,
    resolver: SubscriptionResolver,
    listener: TransactionListener,
    account_token: Option<Uuid>,
    acknowledge_on_delivery: bool,
}

impl SubscriptionManager {
    /// Builds a manager over the commerce store and persistence substrate.
    pub fn new(store: Arc<dyn CommerceStore>, prefs: Arc<dyn PreferenceStore>) -> Self {
        let catalog = Arc::new(ProductCatalog::new(store.clone()));
        let entitlements = Arc::new(EntitlementStore::new(prefs));
        let resolver =
            SubscriptionResolver::new(store.clone(), catalog.clone(), entitlements.clone());
        let listener = TransactionListener::new(store.clone());
        Self {
            store,
            catalog,
            entitlements,
            resolver,
            listener,
            account_token: None,
            acknowledge_on_delivery: true,
        }
    }

    /// Builds a manager from loaded configuration, opening the file-backed
    /// preference store at the configured path.
    pub fn from_config(config: &EntitlementConfig, store: Arc<dyn CommerceStore>) -> Self {
        let prefs = Arc::new(crate::adapters::storage::JsonFilePreferenceStore::open(
            &config.storage.path,
        ));
        let mut manager = Self::new(store, prefs);
        manager.account_token = config.account_token;
        manager.acknowledge_on_delivery = config.listener.acknowledge_on_delivery;
        manager
    }

    /// Scopes purchases to an application account token.
    pub fn with_account_token(mut self, token: Uuid) -> Self {
        self.account_token = Some(token);
        self
    }

    /// Warms the engine: loads the catalog, runs one resolution, and starts
    /// the update listener with acknowledge-on-delivery.
    ///
    /// Errors are absorbed: a failed warm-up forces non-premium and the
    /// engine stays usable.
    pub async fn initialize(&self) {
        match self.catalog.load_all_tiers().await {
            Ok(products) if !products.is_empty() => {
                let entitled = self.resolver.resolve_status().await;
                tracing::debug!("Initial entitlement resolution: {}", entitled);
            }
            Ok(_) => {
                tracing::warn!("Catalog loaded empty, skipping initial resolution");
            }
            Err(e) => {
                tracing::warn!("Catalog load failed during initialization: {}", e);
                self.entitlements.set_entitlement(false, None);
            }
        }

        self.listener
            .start(self.acknowledge_on_delivery, |transaction| async move {
                tracing::debug!(
                    "Transaction update processed for {}",
                    transaction.product_id
                );
            });
    }

    /// Stops the background update listener. Final for that worker.
    pub fn shutdown(&self) {
        self.listener.stop();
    }

    /// Current status from the cache alone; no I/O.
    ///
    /// A non-production development override wins first. In production a
    /// cached lifetime tier wins, then the premium flag.
    pub fn get_status(&self) -> SubscriptionStatus {
        if let Some(simulated) = self.entitlements.development_override().simulated_status() {
            return simulated;
        }
        if self.is_lifetime_subscription() {
            SubscriptionStatus::Lifetime
        } else if self.entitlements.is_premium() {
            SubscriptionStatus::PurchasedPremium
        } else {
            SubscriptionStatus::NonPurchased
        }
    }

    /// Forces a fresh resolution against the commerce store. Never fails;
    /// see [`SubscriptionResolver::resolve_status`].
    pub async fn resolve_status(&self) -> bool {
        self.resolver.resolve_status().await
    }

    /// Purchases `tier`, acknowledging the transaction immediately.
    pub async fn purchase(&self, tier: SubscriptionTier) -> Result<bool, SubscriptionError> {
        self.purchase_with(tier, true).await
    }

    /// Purchases `tier` with an explicit acknowledgment policy.
    ///
    /// With `acknowledge` set, a successful purchase records the tier and
    /// returns true. With acknowledgment deferred, the return value comes
    /// from a full resolution instead, so a successful-but-unacknowledged
    /// purchase still counts. Failures leave the cached status untouched.
    pub async fn purchase_with(
        &self,
        tier: SubscriptionTier,
        acknowledge: bool,
    ) -> Result<bool, SubscriptionError> {
        let product = self.catalog.product_for_tier(tier).await?;
        let purchase = self.execute_purchase(product, acknowledge).await?;

        if purchase.acknowledged {
            self.entitlements.set_entitlement(true, Some(tier));
            Ok(true)
        } else {
            Ok(self.resolver.resolve_status().await)
        }
    }

    /// Convenience variant collapsing every failure to `false`.
    pub async fn purchase_premium(&self, tier: SubscriptionTier) -> bool {
        match self.purchase(tier).await {
            Ok(purchased) => purchased,
            Err(e) => {
                tracing::warn!("Purchase of {} failed: {}", tier, e);
                false
            }
        }
    }

    async fn execute_purchase(
        &self,
        product: Product,
        acknowledge: bool,
    ) -> Result<Purchase, SubscriptionError> {
        let outcome = self
            .store
            .purchase(&product, 1, self.account_token)
            .await
            .map_err(Self::classify_purchase_error)?;

        match outcome {
            PurchaseOutcome::Success(envelope) => {
                // Lenient policy: an unverified envelope is still a purchase.
                let transaction = TransactionVerifier::unwrap(envelope);
                if acknowledge {
                    self.store.acknowledge(&transaction).await;
                }
                Ok(Purchase {
                    product,
                    transaction,
                    acknowledged: acknowledge,
                })
            }
            PurchaseOutcome::UserCancelled => Err(SubscriptionError::PurchaseCancelled),
            PurchaseOutcome::Pending => Err(SubscriptionError::PurchasePending),
        }
    }

    /// Any platform-level purchase failure surfaces as `PurchaseFailed`,
    /// keeping the underlying message. Errors the port already classified
    /// as a purchase outcome or a verification exception keep their kind.
    fn classify_purchase_error(error: SubscriptionError) -> SubscriptionError {
        match error {
            SubscriptionError::VerificationFailed(_)
            | SubscriptionError::PurchaseCancelled
            | SubscriptionError::PurchasePending
            | SubscriptionError::PurchaseFailed(_) => error,
            other => SubscriptionError::PurchaseFailed(other.to_string()),
        }
    }

    /// Restores prior purchases.
    ///
    /// Returns `(restored, requested)`: `requested` is true iff the
    /// platform sync completed, in which case `restored` carries the result
    /// of the follow-up resolution.
    pub async fn restore(&self) -> (bool, bool) {
        if let Err(e) = self.store.sync_restored_purchases().await {
            tracing::warn!("Restore purchases sync failed: {}", e);
            return (false, false);
        }
        (self.resolver.resolve_status().await, true)
    }

    /// Convenience variant collapsing the restore result to a single flag.
    pub async fn restore_purchases(&self) -> bool {
        let (restored, _) = self.restore().await;
        restored
    }

    /// Sets the development override, force-writing the premium flag for
    /// simulated states. `Production` leaves the cached flag alone.
    pub fn set_development_override(&self, mode: DevelopmentOverride) {
        self.entitlements.set_development_override(mode);
        match mode {
            DevelopmentOverride::PremiumSimulated | DevelopmentOverride::LifeTimeSimulated => {
                self.entitlements.set_premium(true);
            }
            DevelopmentOverride::LimitedSimulated => {
                self.entitlements.set_premium(false);
            }
            DevelopmentOverride::Production => {}
        }
    }

    /// Opens the platform's manage-subscriptions UI.
    pub async fn open_manage_subscriptions(&self) -> Result<(), SubscriptionError> {
        self.store.open_manage_subscriptions().await.map_err(|e| {
            tracing::warn!("Manage-subscriptions UI failed to open: {}", e);
            e
        })
    }

    /// Subscribes to premium-flip notifications.
    pub fn subscribe_changes(&self) -> broadcast::Receiver<EntitlementChanged> {
        self.entitlements.subscribe()
    }

    /// True when the cached tier is the lifetime unlock.
    pub fn is_lifetime_subscription(&self) -> bool {
        self.entitlements
            .current_tier()
            .is_some_and(|tier| tier.is_lifetime())
    }

    /// Cached premium flag; no I/O.
    pub fn is_premium(&self) -> bool {
        self.entitlements.is_premium()
    }

    /// Cached tier; no I/O.
    pub fn current_tier(&self) -> Option<SubscriptionTier> {
        self.entitlements.current_tier()
    }
}
