//! Checkout-time order summary and serial numbers.
//!
//! The delivery fee enters here and only here: it is a hard-coded constant
//! per storefront brand, never part of the cart engine's totals. The
//! WhatsApp message that carries the order is an external concern fed from
//! [`OrderSummary`].

use rand::Rng;
use rust_decimal::Decimal;

use mezze_core::CartEntry;

use crate::engine::CartEngine;
use crate::storage::CartStorage;

/// Unambiguous serial alphabet (no 0/O, 1/I).
const SERIAL_CHARS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const SERIAL_RANDOM_LEN: usize = 10;

/// One line of the order summary.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub name: String,
    /// Size label, empty for sizeless items.
    pub size: String,
    pub quantity: u32,
    pub line_total: Decimal,
}

/// The order as submitted at checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub lines: Vec<OrderLine>,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub grand_total: Decimal,
}

impl OrderSummary {
    /// Build a summary from cart entries plus the storefront's delivery
    /// fee.
    #[must_use]
    pub fn new<'a>(
        entries: impl Iterator<Item = &'a CartEntry>,
        delivery_fee: Decimal,
    ) -> Self {
        let lines: Vec<OrderLine> = entries
            .map(|entry| OrderLine {
                name: entry.name.clone(),
                size: entry.product_size.clone(),
                quantity: entry.quantity,
                line_total: entry.line_total(),
            })
            .collect();
        let subtotal: Decimal = lines.iter().map(|line| line.line_total).sum();

        Self {
            lines,
            subtotal,
            delivery_fee,
            grand_total: subtotal + delivery_fee,
        }
    }

    /// Whether there is anything to submit.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl<S: CartStorage> CartEngine<S> {
    /// Snapshot the order summary for the checkout page.
    #[must_use]
    pub fn order_summary(&self, delivery_fee: Decimal) -> OrderSummary {
        OrderSummary::new(self.entries().values(), delivery_fee)
    }

    /// Submit the order: snapshot the summary, then clear the cart and its
    /// persisted value. An empty cart returns `None` and clears nothing.
    pub fn submit_order(&mut self, delivery_fee: Decimal) -> Option<OrderSummary> {
        let summary = self.order_summary(delivery_fee);
        if summary.is_empty() {
            return None;
        }
        self.clear();
        Some(summary)
    }
}

/// Generate an order serial like `MLOOK-AB2CD3EF4G-K7Q2`: a brand prefix,
/// ten random characters from the unambiguous alphabet, and a short
/// time-derived suffix.
#[must_use]
pub fn order_serial(brand_prefix: &str, now_millis: u64) -> String {
    let mut rng = rand::rng();

    let mut random = String::with_capacity(SERIAL_RANDOM_LEN);
    for _ in 0..SERIAL_RANDOM_LEN {
        let index = rng.random_range(0..SERIAL_CHARS.len());
        random.push(char::from(SERIAL_CHARS[index]));
    }

    let scrambled = now_millis ^ u64::from(rng.random_range(0..0x00FF_FFFFu32));
    let suffix = base36_suffix(scrambled, 4);

    format!("{brand_prefix}-{random}-{suffix}")
}

/// The last `len` digits of `value` in uppercase base 36.
fn base36_suffix(mut value: u64, len: usize) -> String {
    const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let mut encoded = Vec::new();
    loop {
        encoded.push(DIGITS[usize::try_from(value % 36).unwrap_or(0)]);
        value /= 36;
        if value == 0 {
            break;
        }
    }
    encoded.reverse();
    let start = encoded.len().saturating_sub(len);
    encoded[start..].iter().map(|&digit| char::from(digit)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mezze_core::{Catalog, Product, ProductId, Section};

    use crate::storage::MemoryStorage;

    fn catalog() -> Catalog {
        let mut section = Section::new("Mains");
        section.products.push(Product {
            id: ProductId::new("P001"),
            name: "Koshari".to_string(),
            price: Decimal::new(10, 0),
            description: String::new(),
            image: String::new(),
            shortcut_to: None,
            variants: Vec::new(),
            base_size: String::new(),
        });
        Catalog {
            sections: vec![section],
        }
    }

    #[test]
    fn test_summary_adds_delivery_fee_once() {
        let mut cart = CartEngine::load(catalog(), MemoryStorage::new(), "co_cart");
        cart.add_to_cart(&ProductId::new("P001"), "").expect("add");
        cart.add_to_cart(&ProductId::new("P001"), "").expect("add");

        let summary = cart.order_summary(Decimal::new(10, 0));
        assert_eq!(summary.lines.len(), 1);
        assert_eq!(summary.lines[0].quantity, 2);
        assert_eq!(summary.subtotal, Decimal::new(20, 0));
        assert_eq!(summary.grand_total, Decimal::new(30, 0));
    }

    #[test]
    fn test_submit_clears_cart_and_storage() {
        let mut cart = CartEngine::load(catalog(), MemoryStorage::new(), "co_cart");
        cart.add_to_cart(&ProductId::new("P001"), "").expect("add");

        let summary = cart.submit_order(Decimal::new(10, 0));
        assert!(summary.is_some());
        assert!(cart.entries().is_empty());

        let storage = cart.into_storage();
        assert_eq!(storage.get("co_cart"), None);
    }

    #[test]
    fn test_submit_on_empty_cart_is_none() {
        let mut cart = CartEngine::load(catalog(), MemoryStorage::new(), "co_cart");
        assert_eq!(cart.submit_order(Decimal::new(10, 0)), None);
    }

    #[test]
    fn test_serial_shape() {
        let serial = order_serial("MLOOK", 1_700_000_000_000);
        let parts: Vec<&str> = serial.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "MLOOK");
        assert_eq!(parts[1].len(), 10);
        assert!(parts[1].bytes().all(|b| SERIAL_CHARS.contains(&b)));
        assert!(!parts[2].is_empty() && parts[2].len() <= 4);
    }
}
