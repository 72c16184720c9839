//! Cart engine errors.
//!
//! The original storefront swallowed these cases silently (an unknown id
//! was a no-op). They are named failures here; callers that want the
//! original UI policy simply ignore the `Err`.

use mezze_core::ProductId;
use thiserror::Error;

/// Errors from cart mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// The product id is not in the catalog snapshot.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// The product exists but has no price option for the requested size.
    #[error("no price option {size:?} on product {product_id}")]
    PriceOptionNotFound {
        product_id: ProductId,
        size: String,
    },
}
