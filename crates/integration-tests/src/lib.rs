//! Integration tests for Mezze.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the CMS against a throwaway data directory
//! CMS_DATA_FILE=/tmp/mezze-test/catalog.json \
//! CMS_IMAGE_DIR=/tmp/mezze-test/images \
//! cargo run -p mezze-cms &
//!
//! # Run integration tests
//! cargo test -p mezze-integration-tests -- --ignored
//! ```
//!
//! The tests talk to a live server over HTTP and mutate its catalog; never
//! point them at real data.

/// Base URL for the CMS API (configurable via environment).
#[must_use]
pub fn cms_base_url() -> String {
    std::env::var("CMS_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}
