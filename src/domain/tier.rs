//! Subscription tier definitions.
//!
//! Represents the fixed set of subscription products available in the store.

use serde::{Deserialize, Serialize};

/// Subscription tier.
///
/// Each tier maps to a stable product identifier in the commerce store's
/// catalog. The set is fixed at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    /// Monthly auto-renewable subscription.
    Month,

    /// Yearly auto-renewable subscription.
    Year,

    /// Weekly auto-renewable subscription.
    Week,

    /// One-time lifetime unlock. Terminal once purchased - no renewal
    /// tracking applies.
    LifeTime,
}

impl SubscriptionTier {
    /// All tiers, in catalog order.
    pub const ALL: [SubscriptionTier; 4] = [
        SubscriptionTier::Month,
        SubscriptionTier::Year,
        SubscriptionTier::Week,
        SubscriptionTier::LifeTime,
    ];

    /// Returns the stable catalog identifier for this tier.
    pub fn product_id(&self) -> &'static str {
        match self {
            SubscriptionTier::Month => "com.month",
            SubscriptionTier::Year => "com.year",
            SubscriptionTier::Week => "com.week",
            SubscriptionTier::LifeTime => "com.lifetime",
        }
    }

    /// Looks up a tier by its catalog identifier.
    pub fn from_product_id(id: &str) -> Option<SubscriptionTier> {
        SubscriptionTier::ALL.into_iter().find(|t| t.product_id() == id)
    }

    /// The full catalog identifier set, as requested from the store.
    pub fn product_ids() -> std::collections::HashSet<String> {
        SubscriptionTier::ALL
            .into_iter()
            .map(|t| t.product_id().to_string())
            .collect()
    }

    /// Returns true for the lifetime unlock.
    pub fn is_lifetime(&self) -> bool {
        matches!(self, SubscriptionTier::LifeTime)
    }

    /// Returns the display name for this tier.
    pub fn display_name(&self) -> &'static str {
        match self {
            SubscriptionTier::Month => "Monthly",
            SubscriptionTier::Year => "Yearly",
            SubscriptionTier::Week => "Weekly",
            SubscriptionTier::LifeTime => "Lifetime",
        }
    }
}

impl std::fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
