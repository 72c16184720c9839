//! Product identifiers and the `P`/`S` prefix namespace.
//!
//! Catalog ids are short strings like `P007` or `S003`. The prefix letter
//! carries meaning: `P` marks an original product, `S` a shortcut (a copied
//! alias living in another section). The two prefixes draw from independent
//! numeric sequences even though they share one lookup space, so `P003` and
//! `S003` can coexist. Downstream conventions (image filenames, cart keys)
//! derive the prefix from the id alone, which is why the namespaces must
//! never be unified.
//!
//! Ids come from a hand-maintained JSON document, so [`ProductId`] stores
//! the raw string as-is and offers tolerant, case-insensitive accessors;
//! strict parsing is available separately for validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The two id namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdPrefix {
    /// An original product (`P...`).
    Original,
    /// A shortcut alias (`S...`).
    Shortcut,
}

impl IdPrefix {
    /// The uppercase prefix letter used in ids.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Original => 'P',
            Self::Shortcut => 'S',
        }
    }

    /// The lowercase letter used in image filenames (`p007.jpg`).
    #[must_use]
    pub const fn lowercase_letter(self) -> char {
        match self {
            Self::Original => 'p',
            Self::Shortcut => 's',
        }
    }

    /// Map a letter (either case) to its namespace.
    #[must_use]
    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'P' | 'p' => Some(Self::Original),
            'S' | 's' => Some(Self::Shortcut),
            _ => None,
        }
    }
}

/// Errors from strict id validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProductIdError {
    /// The id string is empty.
    #[error("product id is empty")]
    Empty,
    /// The id does not start with `P` or `S`.
    #[error("unknown id prefix in {0:?} (expected P or S)")]
    UnknownPrefix(String),
    /// The part after the prefix is not a plain number.
    #[error("invalid numeric suffix in {0:?}")]
    InvalidNumber(String),
}

/// A product identifier, stored verbatim.
///
/// Equality is byte-exact (the document is the source of truth); use
/// [`ProductId::matches`] for the case-insensitive comparison the CMS API
/// performs on incoming ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Wrap a raw id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build a canonical id from a namespace and number, zero-padded to
    /// three digits (`P007`, `S012`). Numbers past 999 keep their full
    /// width.
    #[must_use]
    pub fn from_parts(prefix: IdPrefix, number: u32) -> Self {
        Self(format!("{}{number:03}", prefix.letter()))
    }

    /// The raw id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Uppercased copy, the canonical form the CMS stores and compares.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self(self.0.to_ascii_uppercase())
    }

    /// Case-insensitive comparison against another id.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    /// The id's namespace, judged from the first letter alone.
    #[must_use]
    pub fn prefix(&self) -> Option<IdPrefix> {
        self.0.chars().next().and_then(IdPrefix::from_letter)
    }

    /// Whether this id names a shortcut (`S...`).
    #[must_use]
    pub fn is_shortcut(&self) -> bool {
        self.prefix() == Some(IdPrefix::Shortcut)
    }

    /// The numeric suffix, if this id belongs to `prefix` (case-insensitive
    /// `^{letter}(\d+)$`). Ids that do not match are skipped during
    /// allocation rather than rejected, so hand-edited oddballs never break
    /// the CMS.
    #[must_use]
    pub fn numeric_suffix(&self, prefix: IdPrefix) -> Option<u32> {
        let mut chars = self.0.chars();
        let first = chars.next()?;
        if IdPrefix::from_letter(first) != Some(prefix) {
            return None;
        }
        let rest = chars.as_str();
        if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        rest.parse().ok()
    }

    /// The image filename stem for the base image: lowercase prefix letter
    /// plus the number exactly as written (`P007` -> `p007`).
    #[must_use]
    pub fn image_stem(&self) -> Option<String> {
        let mut chars = self.0.chars();
        let first = chars.next()?;
        Some(format!("{}{}", first.to_ascii_lowercase(), chars.as_str()))
    }

    /// The image filename stem for variant `index` (0-based among kept
    /// variants): base stem plus `a`, `b`, `c`... Only 26 variant slots
    /// exist by convention.
    #[must_use]
    pub fn variant_stem(&self, index: usize) -> Option<String> {
        if index >= 26 {
            return None;
        }
        let suffix = char::from(b'a' + u8::try_from(index).ok()?);
        let mut stem = self.image_stem()?;
        stem.push(suffix);
        Some(stem)
    }

    /// Strict validation: the id must be a prefix letter followed by one or
    /// more digits. Used by `mezze-cli check`, never by the serving path.
    ///
    /// # Errors
    ///
    /// Returns a [`ProductIdError`] describing the first violation.
    pub fn validate(&self) -> Result<(IdPrefix, u32), ProductIdError> {
        let mut chars = self.0.chars();
        let first = chars.next().ok_or(ProductIdError::Empty)?;
        let prefix = IdPrefix::from_letter(first)
            .ok_or_else(|| ProductIdError::UnknownPrefix(self.0.clone()))?;
        let rest = chars.as_str();
        if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ProductIdError::InvalidNumber(self.0.clone()));
        }
        let number = rest
            .parse()
            .map_err(|_| ProductIdError::InvalidNumber(self.0.clone()))?;
        Ok((prefix, number))
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_zero_pads() {
        assert_eq!(ProductId::from_parts(IdPrefix::Original, 4).as_str(), "P004");
        assert_eq!(ProductId::from_parts(IdPrefix::Shortcut, 12).as_str(), "S012");
        assert_eq!(
            ProductId::from_parts(IdPrefix::Original, 1234).as_str(),
            "P1234"
        );
    }

    #[test]
    fn test_numeric_suffix_is_case_insensitive_and_namespace_scoped() {
        let id = ProductId::new("p017");
        assert_eq!(id.numeric_suffix(IdPrefix::Original), Some(17));
        assert_eq!(id.numeric_suffix(IdPrefix::Shortcut), None);

        assert_eq!(
            ProductId::new("P01x").numeric_suffix(IdPrefix::Original),
            None
        );
        assert_eq!(ProductId::new("P").numeric_suffix(IdPrefix::Original), None);
    }

    #[test]
    fn test_image_stems() {
        let id = ProductId::new("P007");
        assert_eq!(id.image_stem().as_deref(), Some("p007"));
        assert_eq!(id.variant_stem(0).as_deref(), Some("p007a"));
        assert_eq!(id.variant_stem(2).as_deref(), Some("p007c"));
        assert_eq!(id.variant_stem(26), None);
    }

    #[test]
    fn test_validate() {
        assert_eq!(
            ProductId::new("S003").validate(),
            Ok((IdPrefix::Shortcut, 3))
        );
        assert_eq!(ProductId::new("").validate(), Err(ProductIdError::Empty));
        assert!(matches!(
            ProductId::new("X001").validate(),
            Err(ProductIdError::UnknownPrefix(_))
        ));
        assert!(matches!(
            ProductId::new("P0a1").validate(),
            Err(ProductIdError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_matches_ignores_case() {
        assert!(ProductId::new("p001").matches(&ProductId::new("P001")));
        assert!(!ProductId::new("P001").matches(&ProductId::new("P002")));
    }
}
