//! Transaction verification unwrap policies.

use crate::domain::transaction::{VerificationFailure, VerificationResult};

/// Unwraps [`VerificationResult`] envelopes delivered by the commerce store.
///
/// Two policies are offered:
///
/// - [`unwrap`](TransactionVerifier::unwrap) accepts both variants and is
///   total. Resolution and purchase paths use it: an unverified payload is
///   still counted toward entitlement.
/// - [`require_verified`](TransactionVerifier::require_verified) rejects
///   unverified payloads. The transaction-update listener uses it so a
///   verification failure is surfaced per event instead of being silently
///   accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionVerifier;

impl TransactionVerifier {
    /// Returns the payload for both variants. Never fails; no side effects.
    pub fn unwrap<T>(result: VerificationResult<T>) -> T {
        match result {
            VerificationResult::Verified(value) => value,
            VerificationResult::Unverified(value, _) => value,
        }
    }

    /// Returns the payload only when verified.
    pub fn require_verified<T>(result: VerificationResult<T>) -> Result<T, VerificationFailure> {
        match result {
            VerificationResult::Verified(value) => Ok(value),
            VerificationResult::Unverified(_, failure) => Err(failure),
        }
    }
}
