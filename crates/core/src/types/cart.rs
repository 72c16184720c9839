//! Cart value types: the composite line-item key, the stored entry, and
//! totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// A cart line-item key: `"{productId}_{size}"`.
///
/// The size may be empty (`"P004_"`) for sizeless products. Ids never
/// contain underscores, so the key splits unambiguously at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartKey(String);

impl CartKey {
    /// Build the key for a product and selected size.
    #[must_use]
    pub fn new(product_id: &ProductId, size: &str) -> Self {
        Self(format!("{product_id}_{size}"))
    }

    /// The raw key string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split back into (product id, size), if the key is well-formed.
    #[must_use]
    pub fn split(&self) -> Option<(ProductId, &str)> {
        let (id, size) = self.0.split_once('_')?;
        Some((ProductId::new(id), size))
    }
}

impl std::fmt::Display for CartKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CartKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for CartKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// One stored cart line item.
///
/// `quantity` is always positive: an entry that would reach zero is
/// removed from the mapping, never stored at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    /// The size label this entry was added under (may be empty).
    #[serde(rename = "productSize")]
    pub product_size: String,
}

impl CartEntry {
    /// This line's contribution to the subtotal.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Cart totals. At this layer `grand_total == subtotal`; delivery fees are
/// a checkout-time concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub grand_total: Decimal,
}

impl CartTotals {
    /// Totals over an iterator of entries.
    #[must_use]
    pub fn of<'a>(entries: impl Iterator<Item = &'a CartEntry>) -> Self {
        let subtotal: Decimal = entries.map(CartEntry::line_total).sum();
        Self {
            subtotal,
            grand_total: subtotal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trips_with_empty_size() {
        let key = CartKey::new(&ProductId::new("P004"), "");
        assert_eq!(key.as_str(), "P004_");
        let (id, size) = key.split().expect("splits");
        assert_eq!(id.as_str(), "P004");
        assert_eq!(size, "");
    }

    #[test]
    fn test_key_splits_at_first_underscore_only() {
        let key = CartKey::new(&ProductId::new("P002"), "Extra_Large");
        let (id, size) = key.split().expect("splits");
        assert_eq!(id.as_str(), "P002");
        assert_eq!(size, "Extra_Large");
    }

    #[test]
    fn test_line_total_and_totals() {
        let entry = CartEntry {
            name: "Koshari".to_string(),
            price: Decimal::new(10, 0),
            quantity: 3,
            product_size: String::new(),
        };
        assert_eq!(entry.line_total(), Decimal::new(30, 0));

        let totals = CartTotals::of([entry].iter());
        assert_eq!(totals.subtotal, Decimal::new(30, 0));
        assert_eq!(totals.grand_total, totals.subtotal);
    }
}
