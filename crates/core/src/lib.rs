//! Mezze Core - Shared types library.
//!
//! This crate provides the common types used across all Mezze components:
//! - `cart` - The client-side cart engine, as a library
//! - `cms` - The catalog CMS server
//! - `cli` - Command-line tools for seeding and validating catalogs
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP, no
//! filesystem access. This keeps it lightweight and allows it to be used
//! anywhere, including environments with no server at all.
//!
//! # Modules
//!
//! - [`types`] - Catalog document model, product-id namespace, lenient
//!   prices, and cart key/entry types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
