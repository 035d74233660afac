//! Typed entitlement cache with change notification.
//!
//! Wraps the `PreferenceStore` port with the three persisted entitlement
//! fields and a typed observer channel. This is the single shared mutable
//! resource of the engine: writes are last-writer-wins, and every write is a
//! complete value, so concurrent resolutions can only cause a transient
//! status flicker, never corruption.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use crate::domain::{DevelopmentOverride, SubscriptionTier};
use crate::ports::PreferenceStore;

const KEY_PREMIUM: &str = "entitlement.premium";
const KEY_TIER: &str = "entitlement.tier";
const KEY_OVERRIDE: &str = "entitlement.dev_override";

/// Broadcast payload emitted when the premium flag actually flips.
///
/// Observers must be idempotent to duplicate or out-of-order delivery
/// relative to their own state reads; delivery order across observers is
/// unspecified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitlementChanged {
    /// The new premium flag.
    pub is_premium: bool,

    /// The tier recorded alongside the flip, if any.
    pub tier: Option<SubscriptionTier>,
}

/// Durable cache of `{is_premium, current_tier, development_override}`.
///
/// Mutated exclusively by the resolver and the development-override setter.
/// Notification is compare-and-notify: a write that does not change the
/// premium flag emits nothing.
pub struct EntitlementStore {
    prefs: Arc<dyn PreferenceStore>,
    changes: broadcast::Sender<EntitlementChanged>,
    // Serializes writes so {premium, tier} always changes as a pair.
    write_lock: Mutex<()>,
}

impl EntitlementStore {
    /// Creates a store over the given persistence substrate.
    pub fn new(prefs: Arc<dyn PreferenceStore>) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            prefs,
            changes,
            write_lock: Mutex::new(()),
        }
    }

    /// Current premium flag. Defaults to false on first run.
    pub fn is_premium(&self) -> bool {
        self.prefs.get_bool(KEY_PREMIUM).unwrap_or(false)
    }

    /// Current subscription tier, if a prior resolution recorded one.
    pub fn current_tier(&self) -> Option<SubscriptionTier> {
        self.prefs
            .get_string(KEY_TIER)
            .and_then(|id| SubscriptionTier::from_product_id(&id))
    }

    /// Current development override. Defaults to `Production`.
    pub fn development_override(&self) -> DevelopmentOverride {
        self.prefs
            .get_int(KEY_OVERRIDE)
            .map(DevelopmentOverride::from_raw)
            .unwrap_or_default()
    }

    /// Writes the premium flag, notifying observers only on an actual flip.
    pub fn set_premium(&self, premium: bool) {
        let _guard = self.write_lock.lock().expect("EntitlementStore: lock poisoned");
        self.write_premium(premium, self.current_tier());
    }

    /// Records the current tier, or clears it with `None`.
    pub fn set_current_tier(&self, tier: Option<SubscriptionTier>) {
        let _guard = self.write_lock.lock().expect("EntitlementStore: lock poisoned");
        self.write_tier(tier);
    }

    /// Writes the `{premium, tier}` pair under one lock so both fields
    /// change together.
    pub fn set_entitlement(&self, premium: bool, tier: Option<SubscriptionTier>) {
        let _guard = self.write_lock.lock().expect("EntitlementStore: lock poisoned");
        self.write_tier(tier);
        self.write_premium(premium, tier);
    }

    /// Persists the development override. Compare-and-set; no notification.
    pub fn set_development_override(&self, mode: DevelopmentOverride) {
        if self.development_override() != mode {
            self.prefs.set_int(KEY_OVERRIDE, mode.as_raw());
        }
    }

    /// Subscribes to premium-flip notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<EntitlementChanged> {
        self.changes.subscribe()
    }

    fn write_tier(&self, tier: Option<SubscriptionTier>) {
        match tier {
            Some(tier) if self.current_tier() != Some(tier) => {
                self.prefs.set_string(KEY_TIER, tier.product_id());
            }
            None if self.current_tier().is_some() => {
                self.prefs.remove(KEY_TIER);
            }
            _ => {}
        }
    }

    fn write_premium(&self, premium: bool, tier: Option<SubscriptionTier>) {
        if self.is_premium() == premium {
            return;
        }
        self.prefs.set_bool(KEY_PREMIUM, premium);
        // Nobody listening is fine.
        let _ = self.changes.send(EntitlementChanged {
            is_premium: premium,
            tier,
        });
        tracing::debug!("Premium entitlement changed: {}", premium);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryPreferenceStore;

    fn store() -> EntitlementStore {
        EntitlementStore::new(Arc::new(InMemoryPreferenceStore::new()))
    }

    #[test]
    fn first_run_defaults() {
        let store = store();
        assert!(!store.is_premium());
        assert_eq!(store.current_tier(), None);
        assert_eq!(store.development_override(), DevelopmentOverride::Production);
    }

    #[test]
    fn premium_flip_notifies_once() {
        let store = store();
        let mut rx = store.subscribe();

        store.set_premium(true);
        let event = rx.try_recv().unwrap();
        assert!(event.is_premium);

        // No further notification queued.
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn rewriting_same_premium_value_does_not_notify() {
        let store = store();
        store.set_premium(true);

        let mut rx = store.subscribe();
        store.set_premium(true);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn set_entitlement_writes_pair_and_notifies_with_tier() {
        let store = store();
        let mut rx = store.subscribe();

        store.set_entitlement(true, Some(SubscriptionTier::Year));

        assert!(store.is_premium());
        assert_eq!(store.current_tier(), Some(SubscriptionTier::Year));
        let event = rx.try_recv().unwrap();
        assert_eq!(event.tier, Some(SubscriptionTier::Year));
    }

    #[test]
    fn set_entitlement_clears_tier() {
        let store = store();
        store.set_entitlement(true, Some(SubscriptionTier::Month));
        store.set_entitlement(false, None);

        assert!(!store.is_premium());
        assert_eq!(store.current_tier(), None);
    }

    #[test]
    fn tier_only_change_does_not_notify() {
        let store = store();
        store.set_premium(true);

        let mut rx = store.subscribe();
        store.set_current_tier(Some(SubscriptionTier::Week));
        assert!(rx.try_recv().is_err());
        assert_eq!(store.current_tier(), Some(SubscriptionTier::Week));
    }

    #[test]
    fn development_override_round_trips() {
        let store = store();
        store.set_development_override(DevelopmentOverride::LifeTimeSimulated);
        assert_eq!(
            store.development_override(),
            DevelopmentOverride::LifeTimeSimulated
        );
    }

    #[test]
    fn multiple_observers_each_receive_the_flip() {
        let store = store();
        let mut first = store.subscribe();
        let mut second = store.subscribe();

        store.set_premium(true);

        assert!(first.try_recv().unwrap().is_premium);
        assert!(second.try_recv().unwrap().is_premium);
    }
}
