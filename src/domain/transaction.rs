//! Transaction records and the verification envelope.
//!
//! A `Transaction` represents one purchase or renewal event observed from the
//! commerce store. The store wraps every delivered transaction in a
//! [`VerificationResult`] stating whether its signature could be verified
//! against the store's trust chain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Product classification from the commerce store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    /// Subscription that renews automatically until cancelled.
    AutoRenewable,

    /// Fixed-duration subscription with no automatic renewal.
    NonRenewable,

    /// One-time purchase that never expires (e.g. lifetime unlock).
    NonConsumable,

    /// Consumable purchase.
    Consumable,
}

/// One purchase/renewal event from the commerce store.
///
/// Unacknowledged transactions may be redelivered by the platform
/// (at-least-once delivery); acknowledgment is performed through the
/// commerce store port, at most once per observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Platform transaction identifier.
    pub id: u64,

    /// Catalog identifier of the purchased product.
    pub product_id: String,

    /// Purchased quantity (always >= 1).
    pub quantity: u32,

    /// When the purchase was refunded or revoked, if ever.
    pub revocation_date: Option<DateTime<Utc>>,

    /// True if a later transaction superseded this one.
    pub is_upgraded: bool,

    /// Product classification.
    pub product_type: ProductType,
}

impl Transaction {
    /// Returns true if this transaction still grants entitlement:
    /// not revoked and not superseded by an upgrade.
    pub fn is_active(&self) -> bool {
        self.revocation_date.is_none() && !self.is_upgraded
    }
}

/// Reason the commerce store could not verify a transaction envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationFailure {
    /// The payload signature did not match.
    InvalidSignature,

    /// The signing certificate chain could not be validated.
    InvalidCertificateChain,

    /// The signing certificate was revoked.
    RevokedCertificate,

    /// Any other platform-reported reason.
    Other(String),
}

impl std::fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationFailure::InvalidSignature => write!(f, "invalid signature"),
            VerificationFailure::InvalidCertificateChain => {
                write!(f, "invalid certificate chain")
            }
            VerificationFailure::RevokedCertificate => write!(f, "revoked certificate"),
            VerificationFailure::Other(reason) => write!(f, "{}", reason),
        }
    }
}

/// A transaction as delivered by the commerce store: either verified against
/// the store's trust chain, or unverified with the reason verification failed.
///
/// The payload is present in both variants; whether to accept an unverified
/// payload is a policy decision made at each call site (see
/// [`TransactionVerifier`](crate::domain::TransactionVerifier)).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationResult<T> {
    /// Signature verified; the payload can be trusted.
    Verified(T),

    /// Verification failed for the given reason; the payload is still
    /// available but untrusted.
    Unverified(T, VerificationFailure),
}

impl<T> VerificationResult<T> {
    /// Returns true for the `Verified` variant.
    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationResult::Verified(_))
    }

    /// Borrows the payload regardless of verification state.
    pub fn payload(&self) -> &T {
        match self {
            VerificationResult::Verified(value) => value,
            VerificationResult::Unverified(value, _) => value,
        }
    }
}
