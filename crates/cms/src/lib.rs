//! Mezze CMS library.
//!
//! This crate provides the catalog CMS as a library, allowing the store
//! and routes to be reused by the binary, the CLI, and tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod store;
