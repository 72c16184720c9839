//! Mezze Cart - The storefront cart engine, as a library.
//!
//! Tracks the shopper's selected products and quantities for one storefront
//! session, keeps the mapping durable across reloads through a pluggable
//! key-value store (the browser `localStorage` analogue), and derives the
//! product-card view states the page renders from.
//!
//! # Architecture
//!
//! - [`engine::CartEngine`] - single owner of the catalog snapshot and the
//!   cart mapping; every mutation persists synchronously before returning
//! - [`storage::CartStorage`] - the persistence seam; one string value per
//!   storefront brand under a single storage key
//! - [`view`] - idempotent reconciliation of all product cards against the
//!   current mapping
//! - [`checkout`] - order summary with the per-storefront delivery fee, and
//!   the order serial generator
//!
//! # Concurrency
//!
//! Strictly single-owner and synchronous. Two engines sharing one storage
//! key (two browser tabs) are not coordinated: last write wins, by design.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod engine;
pub mod error;
pub mod storage;
pub mod view;

pub use checkout::{OrderLine, OrderSummary};
pub use engine::CartEngine;
pub use error::CartError;
pub use storage::{CartStorage, MemoryStorage};
pub use view::{CardControl, CardState, SizeSelection};
