//! The catalog document model.
//!
//! A catalog is an ordered list of sections, each with an ordered list of
//! products; the whole thing lives in one JSON document that is rewritten
//! on every mutation. The model mirrors that document field-for-field and
//! deserializes tolerantly: missing `tag`/`variants`/`base_size`/`image`
//! fields default, unknown tags degrade to `normal`, and prices coerce to
//! zero instead of failing the document.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::id::{IdPrefix, ProductId};
use super::price;

/// Name of the section a brand-new catalog starts with.
pub const DEFAULT_SECTION_NAME: &str = "New Section";

/// Presentational section tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionTag {
    #[default]
    Normal,
    Special,
    BestSeller,
}

impl SectionTag {
    /// The string stored in the document.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Special => "special",
            Self::BestSeller => "best seller",
        }
    }

    /// Parse a tag string; anything unrecognized is `normal`.
    #[must_use]
    pub fn from_str_lossy(tag: &str) -> Self {
        match tag {
            "special" => Self::Special,
            "best seller" => Self::BestSeller,
            _ => Self::Normal,
        }
    }
}

impl std::fmt::Display for SectionTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SectionTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SectionTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_str_lossy(&raw))
    }
}

/// A named price point for a product (e.g. a size), with its own optional
/// description and image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    #[serde(default)]
    pub size: String,
    #[serde(default, with = "price::lenient")]
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

/// A catalog product, original (`P...`) or shortcut (`S...`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default, with = "price::lenient")]
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    /// Present only on shortcuts; the original's id. The copy is made at
    /// creation time and never live-synced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut_to: Option<ProductId>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    /// Label for the size the base `price` represents; empty string means
    /// single-priced with no size label.
    #[serde(default)]
    pub base_size: String,
}

/// Which price point of a product is selected.
///
/// Replaces the original scripts' repeated string matching against
/// `base_size`: the ambiguity of "empty string means no size" is resolved
/// once, here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceOption {
    /// The base price (labelled by `base_size`, possibly empty).
    Base,
    /// The variant at this index.
    Variant(usize),
}

/// A price option resolved against its product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedOption<'a> {
    pub option: PriceOption,
    pub price: Decimal,
    /// The size label for cart keys and display (empty for an unlabelled
    /// base price).
    pub size: &'a str,
    pub description: &'a str,
    pub image: &'a str,
}

impl Product {
    /// Resolve a size string to a price option. The base option wins when
    /// the size equals `base_size` (both empty for sizeless products);
    /// otherwise the variants are searched by exact size.
    #[must_use]
    pub fn resolve_option(&self, size: &str) -> Option<PriceOption> {
        if size == self.base_size {
            return Some(PriceOption::Base);
        }
        self.variants
            .iter()
            .position(|variant| variant.size == size)
            .map(PriceOption::Variant)
    }

    /// Materialize a price option's display data.
    #[must_use]
    pub fn option_details(&self, option: PriceOption) -> Option<ResolvedOption<'_>> {
        match option {
            PriceOption::Base => Some(ResolvedOption {
                option,
                price: self.price,
                size: &self.base_size,
                description: &self.description,
                image: &self.image,
            }),
            PriceOption::Variant(index) => self.variants.get(index).map(|variant| ResolvedOption {
                option,
                price: variant.price,
                size: &variant.size,
                description: &variant.description,
                image: &variant.image,
            }),
        }
    }

    /// Resolve a size straight to its details.
    #[must_use]
    pub fn resolve(&self, size: &str) -> Option<ResolvedOption<'_>> {
        self.resolve_option(size)
            .and_then(|option| self.option_details(option))
    }

    /// The size a freshly rendered card starts on.
    #[must_use]
    pub fn default_size(&self) -> &str {
        &self.base_size
    }

    /// The data-model invariant: a product must have either a positive
    /// base price or at least one variant.
    #[must_use]
    pub fn has_price_source(&self) -> bool {
        self.price > Decimal::ZERO || !self.variants.is_empty()
    }
}

/// A named, ordered grouping of products. The name doubles as the
/// section's identity key; renames are find-by-old-name-replace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(rename = "section")]
    pub name: String,
    #[serde(default)]
    pub tag: SectionTag,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl Section {
    /// A new empty section with the default tag.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: SectionTag::Normal,
            products: Vec::new(),
        }
    }
}

/// The whole catalog: an ordered list of sections, serialized as a bare
/// JSON array.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub sections: Vec<Section>,
}

impl Catalog {
    /// The catalog a brand-new (or unreadable) data file starts from: one
    /// empty default section.
    #[must_use]
    pub fn starter() -> Self {
        Self {
            sections: vec![Section::new(DEFAULT_SECTION_NAME)],
        }
    }

    /// Iterate all products across all sections, in document order.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.sections.iter().flat_map(|section| &section.products)
    }

    /// Find a product anywhere in the catalog (case-insensitive id match,
    /// the comparison the CMS performs on incoming ids).
    #[must_use]
    pub fn find_product(&self, id: &ProductId) -> Option<&Product> {
        self.products().find(|product| product.id.matches(id))
    }

    /// Locate a product as (section index, product index).
    #[must_use]
    pub fn locate(&self, id: &ProductId) -> Option<(usize, usize)> {
        self.sections
            .iter()
            .enumerate()
            .find_map(|(section_index, section)| {
                section
                    .products
                    .iter()
                    .position(|product| product.id.matches(id))
                    .map(|product_index| (section_index, product_index))
            })
    }

    /// Find a section by its exact name.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.name == name)
    }

    /// Find a section by its exact name, mutably.
    pub fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections
            .iter_mut()
            .find(|section| section.name == name)
    }

    /// Allocate the next id in a namespace: max numeric suffix among
    /// matching ids, plus one. The `P` and `S` sequences are independent
    /// even though the ids share one lookup space.
    #[must_use]
    pub fn next_id(&self, prefix: IdPrefix) -> ProductId {
        let max = self
            .products()
            .filter_map(|product| product.id.numeric_suffix(prefix))
            .max()
            .unwrap_or(0);
        ProductId::from_parts(prefix, max + 1)
    }
}
