//! Subscription status query result and the development override switch.

use serde::{Deserialize, Serialize};

/// Authoritative subscription status, as read from the entitlement cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Lifetime unlock owned. Terminal; wins over every other state.
    Lifetime,

    /// An active paid subscription (monthly, yearly, or weekly).
    PurchasedPremium,

    /// No valid paid entitlement.
    NonPurchased,
}

impl SubscriptionStatus {
    /// Returns true if this status grants premium access.
    pub fn is_entitled(&self) -> bool {
        !matches!(self, SubscriptionStatus::NonPurchased)
    }
}

/// Pre-release testing switch that fakes entitlement status without real
/// purchases.
///
/// Any state other than `Production` bypasses real resolution entirely for
/// status queries. The embedding application is responsible for keeping
/// non-production states unreachable in release builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevelopmentOverride {
    /// Real resolution; the override is ignored.
    #[default]
    Production,

    /// Status queries report `PurchasedPremium`.
    PremiumSimulated,

    /// Status queries report `Lifetime`.
    LifeTimeSimulated,

    /// Status queries report `NonPurchased`.
    LimitedSimulated,
}

impl DevelopmentOverride {
    /// Persisted integer representation.
    pub fn as_raw(&self) -> i64 {
        match self {
            DevelopmentOverride::Production => 0,
            DevelopmentOverride::PremiumSimulated => 1,
            DevelopmentOverride::LifeTimeSimulated => 2,
            DevelopmentOverride::LimitedSimulated => 3,
        }
    }

    /// Decodes the persisted representation; unknown values fall back to
    /// `Production`.
    pub fn from_raw(raw: i64) -> DevelopmentOverride {
        match raw {
            1 => DevelopmentOverride::PremiumSimulated,
            2 => DevelopmentOverride::LifeTimeSimulated,
            3 => DevelopmentOverride::LimitedSimulated,
            _ => DevelopmentOverride::Production,
        }
    }

    /// The fixed status this override simulates, or `None` for `Production`.
    pub fn simulated_status(&self) -> Option<SubscriptionStatus> {
        match self {
            DevelopmentOverride::Production => None,
            DevelopmentOverride::PremiumSimulated => Some(SubscriptionStatus::PurchasedPremium),
            DevelopmentOverride::LifeTimeSimulated => Some(SubscriptionStatus::Lifetime),
            DevelopmentOverride::LimitedSimulated => Some(SubscriptionStatus::NonPurchased),
        }
    }
}
