//! Product-card reconciliation.
//!
//! The render step is a pure view over (catalog, cart, selected sizes):
//! calling it after every mutation and on initial page load is safe and
//! idempotent, and it always reconciles *all* cards, not just the mutated
//! one — a size switch changes which cart key is active for a card without
//! any quantity mutation.

use rust_decimal::Decimal;
use std::collections::HashMap;

use mezze_core::{CartKey, PriceOption, Product, ProductId};

use crate::engine::CartEngine;
use crate::storage::CartStorage;

/// Which control a product card shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardControl {
    /// No active-cart quantity: show the "add to cart" button.
    AddButton,
    /// The active key is in the cart: show the quantity stepper.
    Stepper { quantity: u32 },
}

/// The derived display state of one product card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardState {
    pub product_id: ProductId,
    /// The size currently selected on the card (the card's base size until
    /// the shopper picks a variant).
    pub active_size: String,
    /// The cart key future "add" clicks on this card will target.
    pub cart_key: CartKey,
    pub price: Decimal,
    pub name: String,
    pub description: String,
    pub image: String,
    pub control: CardControl,
}

/// Per-card size selections for the current page.
///
/// Switching size does NOT transfer an existing cart quantity to the new
/// key; it only retargets future adds and the displayed option. Two sizes
/// of one product therefore show independent cart states. This mirrors the
/// shipped behavior and is flagged as a candidate product bug, not a
/// design goal.
#[derive(Debug, Clone, Default)]
pub struct SizeSelection {
    selected: HashMap<ProductId, String>,
}

impl SizeSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a size pick for a card.
    pub fn select(&mut self, product_id: ProductId, size: impl Into<String>) {
        self.selected.insert(product_id, size.into());
    }

    /// The size a card is on: the shopper's pick, else the product's base
    /// size.
    #[must_use]
    pub fn active_size<'a>(&'a self, product: &'a Product) -> &'a str {
        self.selected
            .get(&product.id)
            .map_or_else(|| product.default_size(), String::as_str)
    }
}

impl<S: CartStorage> CartEngine<S> {
    /// Reconcile every product card against the current cart mapping, in
    /// document order.
    #[must_use]
    pub fn card_states(&self, selection: &SizeSelection) -> Vec<CardState> {
        self.catalog()
            .products()
            .map(|product| self.card_state(product, selection.active_size(product)))
            .collect()
    }

    /// The display state of one card at a given selected size.
    ///
    /// A size that no longer resolves (the catalog changed underneath a
    /// stale selection) falls back to the base option, like the original's
    /// render safety net.
    #[must_use]
    pub fn card_state(&self, product: &Product, size: &str) -> CardState {
        let resolved = product.resolve(size).unwrap_or_else(|| {
            product
                .option_details(PriceOption::Base)
                .expect("base option always resolves")
        });

        let cart_key = CartKey::new(&product.id, size);
        let quantity = self.quantity_of(&cart_key);
        let control = if quantity > 0 {
            CardControl::Stepper { quantity }
        } else {
            CardControl::AddButton
        };

        CardState {
            product_id: product.id.clone(),
            active_size: size.to_string(),
            cart_key,
            price: resolved.price.max(Decimal::ZERO),
            name: product.name.clone(),
            description: resolved.description.to_string(),
            image: resolved.image.to_string(),
            control,
        }
    }
}
