//! Lenient price handling for untrusted catalog documents.
//!
//! The catalog JSON is maintained through an admin UI with no schema
//! validation, so a price may arrive as a number, a numeric string, null,
//! or be missing entirely. Anything that is not a usable number is coerced
//! to zero rather than failing the whole document.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Serde adapter for price fields: `#[serde(default, with = "price::lenient")]`.
///
/// Serializes as a plain JSON number (matching the documents the original
/// system wrote) and deserializes leniently.
pub mod lenient {
    use super::{Decimal, Deserialize, Deserializer, Serialize, Serializer, coerce_raw};

    /// Raw forms a price field can take in a hand-maintained document.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPrice {
        Number(Decimal),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        // Decimal has an inherent `serialize(&self) -> [u8; 16]` that would
        // shadow the trait method here.
        Serialize::serialize(value, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        // A document that fails this field entirely (e.g. an object where a
        // price should be) still coerces to zero.
        Ok(match RawPrice::deserialize(deserializer) {
            Ok(RawPrice::Number(value)) => value,
            Ok(RawPrice::Text(text)) => coerce_raw(&text),
            Ok(RawPrice::Other(_)) | Err(_) => Decimal::ZERO,
        })
    }
}

/// Parse a numeric string, falling back to zero (the `parseFloat(x) || 0`
/// of the original storefront scripts).
#[must_use]
pub fn coerce_raw(text: &str) -> Decimal {
    text.trim().parse().unwrap_or(Decimal::ZERO)
}
