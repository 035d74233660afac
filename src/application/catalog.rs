//! Product catalog cache.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::{Product, SubscriptionError, SubscriptionTier};
use crate::ports::CommerceStore;

/// Caches the commerce store's product list per identifier set.
///
/// The cache is considered loaded only when the cached identifier set
/// exactly equals the requested set - a full-set comparison, not a superset
/// check - so a catalog fetched for a different id set always triggers a
/// refetch. Concurrent loads are last-writer-wins; catalog data is assumed
/// stable per identifier set within a session, so redundant fetches converge.
pub struct ProductCatalog {
    store: Arc<dyn CommerceStore>,
    products: RwLock<Vec<Product>>,
}

impl ProductCatalog {
    /// Creates an empty catalog over the given commerce store.
    pub fn new(store: Arc<dyn CommerceStore>) -> Self {
        Self {
            store,
            products: RwLock::new(Vec::new()),
        }
    }

    /// Returns products for `ids`, fetching from the store on cache miss.
    pub async fn load(&self, ids: &HashSet<String>) -> Result<Vec<Product>, SubscriptionError> {
        {
            let cached = self.products.read().await;
            if Self::covers(&cached, ids) {
                return Ok(cached.clone());
            }
        }

        tracing::debug!("Catalog cache miss, fetching {} products", ids.len());
        let fetched = self.store.fetch_products(ids).await?;
        *self.products.write().await = fetched.clone();
        Ok(fetched)
    }

    /// Loads the full tier catalog.
    pub async fn load_all_tiers(&self) -> Result<Vec<Product>, SubscriptionError> {
        self.load(&SubscriptionTier::product_ids()).await
    }

    /// Looks up a tier's product in the catalog, fetching on miss.
    pub async fn product_for_tier(
        &self,
        tier: SubscriptionTier,
    ) -> Result<Product, SubscriptionError> {
        let products = self.load_all_tiers().await?;
        products
            .into_iter()
            .find(|p| p.id == tier.product_id())
            .ok_or_else(|| SubscriptionError::ProductNotFound(tier.product_id().to_string()))
    }

    fn covers(cached: &[Product], ids: &HashSet<String>) -> bool {
        if cached.is_empty() {
            return false;
        }
        let cached_ids: HashSet<&str> = cached.iter().map(|p| p.id.as_str()).collect();
        cached_ids.len() == ids.len() && ids.iter().all(|id| cached_ids.contains(id.as_str()))
    }
}
