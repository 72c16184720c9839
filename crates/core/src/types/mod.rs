//! Core types for Mezze.
//!
//! This module provides the catalog document model and the cart value types.

pub mod cart;
pub mod catalog;
pub mod id;
pub mod price;

pub use cart::{CartEntry, CartKey, CartTotals};
pub use catalog::{Catalog, PriceOption, Product, ResolvedOption, Section, SectionTag, Variant};
pub use id::{IdPrefix, ProductId, ProductIdError};
