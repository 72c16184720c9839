//! The cart engine: a single-owner store for the session's line items.
//!
//! Every mutation is immediately followed by a synchronous save to the
//! backing storage; there is no batching or async I/O. The catalog
//! snapshot is loaded once per page load and owned by the engine.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use mezze_core::{CartEntry, CartKey, CartTotals, Catalog, ProductId};

use crate::error::CartError;
use crate::storage::CartStorage;

/// The cart engine for one storefront session.
pub struct CartEngine<S: CartStorage> {
    catalog: Catalog,
    entries: BTreeMap<CartKey, CartEntry>,
    storage: S,
    storage_key: String,
}

impl<S: CartStorage> CartEngine<S> {
    /// Create an engine over a catalog snapshot, restoring any persisted
    /// cart from `storage_key`. A corrupted stored value loads as an empty
    /// cart.
    pub fn load(catalog: Catalog, storage: S, storage_key: impl Into<String>) -> Self {
        let storage_key = storage_key.into();
        let entries = storage
            .get(&storage_key)
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(entries) => Some(entries),
                Err(error) => {
                    tracing::warn!(%error, "discarding corrupted stored cart");
                    None
                }
            })
            .unwrap_or_default();

        Self {
            catalog,
            entries,
            storage,
            storage_key,
        }
    }

    /// Add one unit of a product in the given size.
    ///
    /// Creates the entry at quantity 1 on first add, increments it
    /// afterwards, and persists. Returns the entry's new quantity.
    ///
    /// # Errors
    ///
    /// [`CartError::ProductNotFound`] if the id is not in the catalog;
    /// [`CartError::PriceOptionNotFound`] if the size matches neither the
    /// base size nor any variant. Callers following the original UI policy
    /// treat both as a no-op.
    pub fn add_to_cart(&mut self, product_id: &ProductId, size: &str) -> Result<u32, CartError> {
        let product = self
            .catalog
            .find_product(product_id)
            .ok_or_else(|| CartError::ProductNotFound(product_id.clone()))?;
        let resolved = product
            .resolve(size)
            .ok_or_else(|| CartError::PriceOptionNotFound {
                product_id: product_id.clone(),
                size: size.to_string(),
            })?;

        let key = CartKey::new(&product.id, size);
        let entry = self.entries.entry(key).or_insert_with(|| CartEntry {
            name: product.name.clone(),
            // Catalog data is untrusted; a negative price would corrupt the
            // subtotal invariant.
            price: resolved.price.max(Decimal::ZERO),
            quantity: 0,
            product_size: size.to_string(),
        });
        entry.quantity += 1;
        let quantity = entry.quantity;

        self.persist();
        Ok(quantity)
    }

    /// Add `delta` (usually ±1) to an entry's quantity. A result of zero
    /// or less deletes the entry entirely. Returns the remaining quantity
    /// (0 when removed or the key was absent). Persists either way, like
    /// the original.
    pub fn update_quantity(&mut self, key: &CartKey, delta: i32) -> u32 {
        let remaining = if let Some(entry) = self.entries.get_mut(key) {
            let updated = i64::from(entry.quantity) + i64::from(delta);
            if updated <= 0 {
                self.entries.remove(key);
                0
            } else {
                entry.quantity = u32::try_from(updated).unwrap_or(u32::MAX);
                entry.quantity
            }
        } else {
            0
        };

        self.persist();
        remaining
    }

    /// Delete an entry unconditionally, regardless of quantity.
    pub fn remove_all(&mut self, key: &CartKey) {
        self.entries.remove(key);
        self.persist();
    }

    /// Empty the cart and drop the persisted value (the successful-checkout
    /// path).
    pub fn clear(&mut self) {
        self.entries.clear();
        self.storage.remove(&self.storage_key);
    }

    /// Current totals. `grand_total == subtotal` at this layer; delivery
    /// fees are added at checkout only.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals::of(self.entries.values())
    }

    /// Total number of units across all entries (the cart badge count).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.entries
            .values()
            .fold(0, |count, entry| count.saturating_add(entry.quantity))
    }

    /// The stored quantity for a cart key (0 if absent).
    #[must_use]
    pub fn quantity_of(&self, key: &CartKey) -> u32 {
        self.entries.get(key).map_or(0, |entry| entry.quantity)
    }

    /// The current mapping, in stable key order.
    #[must_use]
    pub fn entries(&self) -> &BTreeMap<CartKey, CartEntry> {
        &self.entries
    }

    /// The catalog snapshot this engine renders from.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Tear down the engine and hand back its storage.
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn persist(&mut self) {
        match serde_json::to_string(&self.entries) {
            Ok(serialized) => self.storage.set(&self.storage_key, &serialized),
            Err(error) => tracing::warn!(%error, "failed to serialize cart"),
        }
    }
}
