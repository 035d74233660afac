//! Catalog product snapshot.

use serde::{Deserialize, Serialize};

use crate::domain::transaction::ProductType;

/// A product as returned by the commerce store's catalog lookup.
///
/// Catalog data is assumed stable for a given identifier set within a
/// session, so snapshots can be cached by identifier set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Stable catalog identifier.
    pub id: String,

    /// Localized display name.
    pub display_name: String,

    /// Localized, formatted price string.
    pub display_price: String,

    /// Product classification.
    pub product_type: ProductType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_serde_round_trips() {
        let product = Product {
            id: "com.year".to_string(),
            display_name: "Yearly".to_string(),
            display_price: "$29.99".to_string(),
            product_type: ProductType::AutoRenewable,
        };
        let json = serde_json::to_string(&product).unwrap();
        let back: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(back, product);
    }
}
