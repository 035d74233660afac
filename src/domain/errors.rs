//! Subscription error taxonomy.
//!
//! Errors raised by purchase and restore flows are surfaced to the immediate
//! caller; errors inside status resolution are absorbed at the resolver
//! boundary (logged, status forced to non-premium) so the entitlement answer
//! is always definite.

use thiserror::Error;

use crate::domain::transaction::VerificationFailure;

/// Errors from entitlement operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    /// A transaction envelope could not be verified.
    #[error("Transaction verification failed: {0}")]
    VerificationFailed(VerificationFailure),

    /// The commerce store could not be reached or returned an error.
    #[error("Commerce store unavailable: {0}")]
    StoreUnavailable(String),

    /// The requested tier has no product in the loaded catalog.
    #[error("Product not found in catalog: {0}")]
    ProductNotFound(String),

    /// The user cancelled the purchase flow.
    #[error("Purchase was cancelled by the user")]
    PurchaseCancelled,

    /// The purchase is awaiting external approval (e.g. parental consent).
    #[error("Purchase is pending approval")]
    PurchasePending,

    /// The purchase failed for any other reason.
    #[error("Purchase failed: {0}")]
    PurchaseFailed(String),

    /// The restore-purchases sync failed.
    #[error("Restore purchases failed: {0}")]
    RestoreFailed(String),
}

impl SubscriptionError {
    /// User-facing message for this error kind.
    ///
    /// Keys into the embedding application's localization table; unknown
    /// platform errors fall back to the generic message rather than crashing.
    pub fn user_message(&self) -> &'static str {
        match self {
            SubscriptionError::VerificationFailed(_) => {
                "Your purchase could not be verified. Please try again."
            }
            SubscriptionError::StoreUnavailable(_) => {
                "The store is currently unavailable. Please check your connection."
            }
            SubscriptionError::ProductNotFound(_) => {
                "This subscription is not available right now."
            }
            SubscriptionError::PurchaseCancelled => "The purchase was cancelled.",
            SubscriptionError::PurchasePending => {
                "Your purchase is awaiting approval."
            }
            SubscriptionError::PurchaseFailed(_) => {
                "The purchase could not be completed. Please try again."
            }
            SubscriptionError::RestoreFailed(_) => {
                "Purchases could not be restored. Please try again."
            }
        }
    }
}

impl From<VerificationFailure> for SubscriptionError {
    fn from(failure: VerificationFailure) -> Self {
        SubscriptionError::VerificationFailed(failure)
    }
}
