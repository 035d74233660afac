//! Transient result of a successful purchase call.

use serde::{Deserialize, Serialize};

use crate::domain::product::Product;
use crate::domain::transaction::Transaction;

/// Outcome of a completed purchase, handed back to the caller and not
/// persisted.
///
/// When `acknowledged` is false the caller deferred acknowledgment and must
/// finish the transaction itself (or rely on a later full resolution) before
/// the platform stops redelivering it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    /// The catalog product that was bought.
    pub product: Product,

    /// The resulting transaction record.
    pub transaction: Transaction,

    /// Whether the transaction was acknowledged ("finished") during the
    /// purchase flow.
    pub acknowledged: bool,
}

impl Purchase {
    /// Catalog identifier of the purchased product.
    pub fn product_id(&self) -> &str {
        &self.transaction.product_id
    }

    /// Purchased quantity.
    pub fn quantity(&self) -> u32 {
        self.transaction.quantity
    }
}
