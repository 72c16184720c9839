//! The flat-file catalog store.
//!
//! One JSON document is the whole database: every mutation is a full
//! read-modify-write that reparses the document, edits it in memory, and
//! rewrites it pretty-printed. There is no locking and no optimistic
//! concurrency token; the CMS assumes a single admin actor, and when two
//! admins race the slower write silently wins.
//!
//! Image files live beside the document (see [`images`]) and are not
//! transactional with it; the store cleans up after its own failures where
//! it can, and logs what it cannot.

pub mod images;

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use rust_decimal::Decimal;
use thiserror::Error;

use mezze_core::{Catalog, IdPrefix, Product, ProductId, Section, SectionTag, Variant};

pub use images::{ImageError, ImageStore, NewImage};

/// Errors from catalog store operations.
///
/// Only [`StoreError::Io`] (and an I/O failure inside an image operation)
/// is a server fault; everything else is a domain-level rejection the API
/// reports inside a successful HTTP exchange.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the catalog document failed.
    #[error("Failed to access catalog data: {0}")]
    Io(#[from] std::io::Error),

    /// The request failed validation.
    #[error("{0}")]
    Invalid(String),

    /// No section has this name.
    #[error("Section not found: {0}")]
    SectionNotFound(String),

    /// No product has this id.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Shortcuts are copies; they are deleted and re-created, not edited.
    #[error("Shortcut products cannot be edited: {0}")]
    ShortcutNotEditable(ProductId),

    /// An image operation failed.
    #[error(transparent)]
    Image(#[from] ImageError),
}

impl StoreError {
    /// Whether this error is a server-side I/O fault (HTTP 500 territory)
    /// rather than a domain rejection.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Image(ImageError::Io(_)))
    }
}

/// An incoming variant row, positionally aligned with its siblings by the
/// multipart layer.
#[derive(Debug, Default)]
pub struct VariantInput {
    pub size: String,
    pub price: Decimal,
    pub description: String,
    pub image: Option<NewImage>,
}

/// Input for `add_product`.
#[derive(Debug, Default)]
pub struct ProductInput {
    pub section: String,
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub base_size: String,
    pub image: Option<NewImage>,
    pub variants: Vec<VariantInput>,
}

/// An incoming variant row for `edit_product`: carries the previous image
/// path and a per-row delete flag on top of [`VariantInput`].
#[derive(Debug, Default)]
pub struct VariantEdit {
    pub size: String,
    pub price: Decimal,
    pub description: String,
    /// The variant's previous image path, echoed back by the editor.
    pub old_image: String,
    pub delete_image: bool,
    pub image: Option<NewImage>,
}

/// Input for `edit_product`.
#[derive(Debug, Default)]
pub struct ProductEdit {
    pub section: String,
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub base_size: String,
    pub image: Option<NewImage>,
    pub delete_base_image: bool,
    pub variants: Vec<VariantEdit>,
}

/// Outcome of deleting a section.
#[derive(Debug)]
pub struct SectionDeletion {
    /// Some image files could not be removed (logged; never aborts).
    pub failed_image_deletes: bool,
}

/// Outcome of deleting a product.
#[derive(Debug)]
pub struct ProductDeletion {
    pub was_shortcut: bool,
    pub failed_image_deletes: bool,
}

/// The catalog document plus its image directory.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    data_file: PathBuf,
    images: ImageStore,
}

impl CatalogStore {
    #[must_use]
    pub fn new(data_file: impl Into<PathBuf>, image_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            images: ImageStore::new(image_dir),
        }
    }

    /// The image store (used by the binary to serve the directory).
    #[must_use]
    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    /// Read the current document. A missing file or one that fails to
    /// decode yields the starter catalog; only a real read failure is an
    /// error.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] when the file exists but cannot be read.
    pub fn load(&self) -> Result<Catalog, StoreError> {
        let raw = match fs::read_to_string(&self.data_file) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Catalog::starter());
            }
            Err(error) => return Err(error.into()),
        };

        match serde_json::from_str(&raw) {
            Ok(catalog) => Ok(catalog),
            Err(error) => {
                tracing::warn!(
                    path = %self.data_file.display(),
                    %error,
                    "catalog document is not valid JSON, starting fresh"
                );
                Ok(Catalog::starter())
            }
        }
    }

    /// Write the full document, pretty-printed with a trailing newline so
    /// it stays diffable and hand-editable.
    fn save(&self, catalog: &Catalog) -> Result<(), StoreError> {
        if let Some(parent) = self.data_file.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut body = serde_json::to_string_pretty(catalog)
            .map_err(|e| StoreError::Invalid(format!("Failed to encode catalog: {e}")))?;
        body.push('\n');
        fs::write(&self.data_file, body)?;
        Ok(())
    }

    /// Append a new empty section.
    ///
    /// # Errors
    ///
    /// Rejects an empty (after trim) or duplicate name.
    pub fn add_section(&self, name: &str) -> Result<(), StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::Invalid("Section name is required".to_string()));
        }

        let mut catalog = self.load()?;
        if catalog.section(name).is_some() {
            return Err(StoreError::Invalid(format!(
                "Section already exists: {name}"
            )));
        }

        catalog.sections.push(Section::new(name));
        self.save(&catalog)
    }

    /// Rename and/or retag a section in place.
    ///
    /// # Errors
    ///
    /// Rejects empty names, a rename onto an existing other section, or an
    /// unknown old name.
    pub fn edit_section(
        &self,
        old_name: &str,
        new_name: &str,
        new_tag: Option<&str>,
    ) -> Result<(), StoreError> {
        let old_name = old_name.trim();
        let new_name = new_name.trim();
        if old_name.is_empty() || new_name.is_empty() {
            return Err(StoreError::Invalid("Section name is required".to_string()));
        }

        let mut catalog = self.load()?;
        if new_name != old_name && catalog.section(new_name).is_some() {
            return Err(StoreError::Invalid(format!(
                "Section already exists: {new_name}"
            )));
        }
        let section = catalog
            .section_mut(old_name)
            .ok_or_else(|| StoreError::SectionNotFound(old_name.to_string()))?;

        section.name = new_name.to_string();
        if let Some(tag) = new_tag {
            section.tag = SectionTag::from_str_lossy(tag);
        }
        self.save(&catalog)
    }

    /// Remove a section and the images of every product in it. Shortcut
    /// images are deleted individually by their stored path; originals are
    /// prefix-glob deleted so no variant file survives.
    ///
    /// # Errors
    ///
    /// Rejects an unknown section name. Failed image deletes never abort.
    pub fn delete_section(&self, name: &str) -> Result<SectionDeletion, StoreError> {
        let mut catalog = self.load()?;
        let index = catalog
            .sections
            .iter()
            .position(|section| section.name == name)
            .ok_or_else(|| StoreError::SectionNotFound(name.to_string()))?;

        let section = catalog.sections.remove(index);
        let mut all_deleted = true;
        for product in &section.products {
            let deleted = if is_shortcut(product) {
                product.image.is_empty() || self.images.delete_relative(&product.image)
            } else {
                self.images.delete_all_for(&product.id)
            };
            all_deleted &= deleted;
        }

        self.save(&catalog)?;
        Ok(SectionDeletion {
            failed_image_deletes: !all_deleted,
        })
    }

    /// Reorder sections to the given name list. Names not in the list keep
    /// their relative order and go to the end; unknown names are ignored,
    /// so an empty list is a no-op that keeps every section where it was.
    ///
    /// Returns the resulting catalog for the response body.
    ///
    /// # Errors
    ///
    /// Propagates document I/O failures only.
    pub fn reorder_sections(&self, order: &[String]) -> Result<Catalog, StoreError> {
        let mut catalog = self.load()?;
        let mut remaining = std::mem::take(&mut catalog.sections);
        let mut reordered = Vec::with_capacity(remaining.len());
        for name in order {
            if let Some(index) = remaining.iter().position(|section| &section.name == name) {
                reordered.push(remaining.remove(index));
            }
        }
        reordered.append(&mut remaining);
        catalog.sections = reordered;

        self.save(&catalog)?;
        Ok(catalog)
    }

    /// Reorder the products of one section to the given id list, same
    /// append-the-omitted semantics as [`Self::reorder_sections`].
    ///
    /// # Errors
    ///
    /// Rejects an empty order or an unknown section.
    pub fn reorder_products(
        &self,
        section_name: &str,
        order: &[String],
    ) -> Result<Catalog, StoreError> {
        if section_name.is_empty() || order.is_empty() {
            return Err(StoreError::Invalid(
                "Section name and new order are required".to_string(),
            ));
        }

        let mut catalog = self.load()?;
        let section = catalog
            .section_mut(section_name)
            .ok_or_else(|| StoreError::SectionNotFound(section_name.to_string()))?;

        let mut remaining = std::mem::take(&mut section.products);
        let mut reordered = Vec::with_capacity(remaining.len());
        for id in order {
            if let Some(index) = remaining
                .iter()
                .position(|product| product.id.as_str() == id)
            {
                reordered.push(remaining.remove(index));
            }
        }
        reordered.append(&mut remaining);
        section.products = reordered;

        self.save(&catalog)?;
        Ok(catalog)
    }

    /// Create a product with the next `P` id.
    ///
    /// Images are stored before validation (their slots are keyed by the
    /// freshly allocated id); any rejection after that point removes every
    /// file written for the id, so a failed add never orphans images.
    ///
    /// # Errors
    ///
    /// Rejects a missing name, a product with neither a positive base price
    /// nor a variant, duplicate variant sizes, or an unknown section.
    pub fn add_product(&self, input: ProductInput) -> Result<ProductId, StoreError> {
        let mut catalog = self.load()?;
        let id = catalog.next_id(IdPrefix::Original);

        let base_image = match &input.image {
            Some(upload) if !upload.is_empty() => self.images.store(upload, &id, None)?,
            _ => String::new(),
        };

        // Rows without a size or a positive price are dropped; the letter
        // suffix counts kept rows only.
        let mut variants = Vec::new();
        for row in &input.variants {
            let size = row.size.trim();
            if size.is_empty() || row.price <= Decimal::ZERO {
                continue;
            }
            let image = match &row.image {
                Some(upload) if !upload.is_empty() => {
                    match self.images.store(upload, &id, Some(variants.len())) {
                        Ok(path) => path,
                        Err(error) => {
                            tracing::warn!(id = %id, size, %error, "variant image rejected, using base image");
                            base_image.clone()
                        }
                    }
                }
                _ => base_image.clone(),
            };
            variants.push(Variant {
                size: size.to_string(),
                price: row.price,
                description: row.description.clone(),
                image,
            });
        }

        if let Err(error) = validate_product(&input.name, input.price, &variants) {
            self.images.delete_all_for(&id);
            return Err(error);
        }

        let product = Product {
            id: id.clone(),
            name: input.name.trim().to_string(),
            price: input.price.max(Decimal::ZERO),
            description: input.description,
            image: base_image,
            shortcut_to: None,
            variants,
            base_size: input.base_size,
        };

        let Some(section) = catalog.section_mut(&input.section) else {
            self.images.delete_all_for(&id);
            return Err(StoreError::SectionNotFound(input.section));
        };
        section.products.push(product);

        if let Err(error) = self.save(&catalog) {
            self.images.delete_all_for(&id);
            return Err(error);
        }
        Ok(id)
    }

    /// Edit an original product in place, optionally moving it to another
    /// section.
    ///
    /// Validation runs before any file is touched; image slots are then
    /// replaced or cleared per the edit's flags, and the variant list is
    /// rebuilt (a kept row without a new upload keeps its old image path
    /// when it has one, else the base image).
    ///
    /// # Errors
    ///
    /// Rejects unknown ids, shortcut ids, the same validation failures as
    /// [`Self::add_product`], and an unknown target section.
    pub fn edit_product(&self, id: &ProductId, edit: ProductEdit) -> Result<(), StoreError> {
        let mut catalog = self.load()?;
        let (section_index, product_index) = catalog
            .locate(id)
            .ok_or_else(|| StoreError::ProductNotFound(id.clone()))?;

        let product = catalog.sections[section_index].products[product_index].clone();
        if is_shortcut(&product) {
            return Err(StoreError::ShortcutNotEditable(product.id));
        }

        let kept: Vec<&VariantEdit> = edit
            .variants
            .iter()
            .filter(|row| !row.size.trim().is_empty() && row.price > Decimal::ZERO)
            .collect();
        validate_edit(&edit.name, edit.price, &kept)?;

        // The stored id keeps its original spelling; image stems derive
        // from it, not from the id the request used.
        let stored_id = product.id.clone();

        let base_image = if edit.delete_base_image {
            if let Some(stem) = stored_id.image_stem() {
                self.images.delete_by_stem(&stem);
            }
            String::new()
        } else if let Some(upload) = edit.image.as_ref().filter(|upload| !upload.is_empty()) {
            self.images.store(upload, &stored_id, None)?
        } else {
            product.image.clone()
        };

        let mut variants = Vec::with_capacity(kept.len());
        for (index, row) in kept.iter().enumerate() {
            let current = if row.old_image.is_empty() {
                base_image.clone()
            } else {
                row.old_image.clone()
            };
            let image = if row.delete_image {
                if let Some(stem) = stored_id.variant_stem(index) {
                    self.images.delete_by_stem(&stem);
                }
                base_image.clone()
            } else if let Some(upload) = row.image.as_ref().filter(|upload| !upload.is_empty()) {
                match self.images.store(upload, &stored_id, Some(index)) {
                    Ok(path) => path,
                    Err(error) => {
                        tracing::warn!(id = %stored_id, size = row.size, %error, "variant image rejected, keeping previous");
                        current
                    }
                }
            } else {
                current
            };
            variants.push(Variant {
                size: row.size.trim().to_string(),
                price: row.price,
                description: row.description.clone(),
                image,
            });
        }

        let updated = Product {
            id: stored_id,
            name: edit.name.trim().to_string(),
            price: edit.price.max(Decimal::ZERO),
            description: edit.description,
            image: base_image,
            shortcut_to: None,
            variants,
            base_size: edit.base_size,
        };

        let current_section = catalog.sections[section_index].name.clone();
        if edit.section.is_empty() || edit.section == current_section {
            catalog.sections[section_index].products[product_index] = updated;
        } else {
            if catalog.section(&edit.section).is_none() {
                return Err(StoreError::SectionNotFound(edit.section));
            }
            catalog.sections[section_index]
                .products
                .remove(product_index);
            if let Some(target) = catalog.section_mut(&edit.section) {
                target.products.push(updated);
            }
        }

        self.save(&catalog)
    }

    /// Create a shortcut: a deep copy of an original product placed in
    /// another section under the next `S` id. The copy is made once and
    /// never live-synced; later edits of the original do not touch it.
    ///
    /// # Errors
    ///
    /// Rejects non-`P` targets, unknown targets or sections; a failed
    /// image copy aborts the whole creation.
    pub fn add_shortcut(
        &self,
        target_id: &ProductId,
        section_name: &str,
    ) -> Result<ProductId, StoreError> {
        if target_id.prefix() != Some(IdPrefix::Original) {
            return Err(StoreError::Invalid(
                "Shortcuts can only point to original products".to_string(),
            ));
        }

        let mut catalog = self.load()?;
        let original = catalog
            .find_product(target_id)
            .ok_or_else(|| StoreError::ProductNotFound(target_id.clone()))?
            .clone();

        let id = catalog.next_id(IdPrefix::Shortcut);

        let image = if original.image.is_empty() {
            String::new()
        } else {
            self.images
                .copy_for_shortcut(&original.image, &id)?
                .unwrap_or_default()
        };

        let shortcut = Product {
            id: id.clone(),
            name: original.name,
            price: original.price,
            description: original.description,
            image: image.clone(),
            shortcut_to: Some(original.id),
            variants: original.variants,
            base_size: original.base_size,
        };

        let Some(section) = catalog.section_mut(section_name) else {
            if !image.is_empty() {
                self.images.delete_relative(&image);
            }
            return Err(StoreError::SectionNotFound(section_name.to_string()));
        };
        section.products.push(shortcut);

        if let Err(error) = self.save(&catalog) {
            if !image.is_empty() {
                self.images.delete_relative(&image);
            }
            return Err(error);
        }
        Ok(id)
    }

    /// Delete a product. Originals take their whole image family with
    /// them; a shortcut only removes its own copied file.
    ///
    /// # Errors
    ///
    /// Rejects an unknown id. Failed image deletes never abort.
    pub fn delete_product(&self, id: &ProductId) -> Result<ProductDeletion, StoreError> {
        let mut catalog = self.load()?;
        let (section_index, product_index) = catalog
            .locate(id)
            .ok_or_else(|| StoreError::ProductNotFound(id.clone()))?;

        let product = catalog.sections[section_index]
            .products
            .remove(product_index);
        let was_shortcut = is_shortcut(&product);
        let all_deleted = if was_shortcut {
            product.image.is_empty() || self.images.delete_relative(&product.image)
        } else {
            self.images.delete_all_for(&product.id)
        };

        self.save(&catalog)?;
        Ok(ProductDeletion {
            was_shortcut,
            failed_image_deletes: !all_deleted,
        })
    }
}

/// A shortcut is marked by its `shortcut_to` field, with the id prefix as
/// the fallback for hand-edited documents.
fn is_shortcut(product: &Product) -> bool {
    product.shortcut_to.is_some() || product.id.is_shortcut()
}

fn validate_product(name: &str, price: Decimal, variants: &[Variant]) -> Result<(), StoreError> {
    if name.trim().is_empty() {
        return Err(StoreError::Invalid("Product name is required".to_string()));
    }
    if price <= Decimal::ZERO && variants.is_empty() {
        return Err(StoreError::Invalid(
            "A price or at least one size is required".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for variant in variants {
        if !seen.insert(variant.size.as_str()) {
            return Err(StoreError::Invalid(format!(
                "Duplicate size: {}",
                variant.size
            )));
        }
    }
    Ok(())
}

fn validate_edit(name: &str, price: Decimal, kept: &[&VariantEdit]) -> Result<(), StoreError> {
    if name.trim().is_empty() {
        return Err(StoreError::Invalid("Product name is required".to_string()));
    }
    if price <= Decimal::ZERO && kept.is_empty() {
        return Err(StoreError::Invalid(
            "A price or at least one size is required".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for row in kept {
        let size = row.size.trim();
        if !seen.insert(size) {
            return Err(StoreError::Invalid(format!("Duplicate size: {size}")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        store: CatalogStore,
        image_dir: PathBuf,
        data_file: PathBuf,
    }

    fn fixture() -> Fixture {
        let tmp = TempDir::new().expect("tempdir");
        let data_file = tmp.path().join("catalog.json");
        let image_dir = tmp.path().join("images");
        let store = CatalogStore::new(&data_file, &image_dir);
        Fixture {
            _tmp: tmp,
            store,
            image_dir,
            data_file,
        }
    }

    fn jpeg(name: &str) -> NewImage {
        NewImage {
            file_name: name.to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
        }
    }

    fn image_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .map(|entries| {
                entries
                    .flatten()
                    .filter_map(|entry| entry.file_name().to_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    fn simple_product(section: &str, name: &str, price: i64) -> ProductInput {
        ProductInput {
            section: section.to_string(),
            name: name.to_string(),
            price: Decimal::new(price, 0),
            ..ProductInput::default()
        }
    }

    #[test]
    fn test_missing_file_loads_starter_catalog() {
        let fx = fixture();
        let catalog = fx.store.load().expect("load");
        assert_eq!(catalog.sections.len(), 1);
        assert_eq!(catalog.sections[0].name, "New Section");
        assert!(catalog.sections[0].products.is_empty());
    }

    #[test]
    fn test_undecodable_file_loads_starter_catalog() {
        let fx = fixture();
        fs::write(&fx.data_file, "{not json").expect("write");
        let catalog = fx.store.load().expect("load");
        assert_eq!(catalog.sections[0].name, "New Section");
    }

    #[test]
    fn test_save_is_pretty_printed_with_trailing_newline() {
        let fx = fixture();
        fx.store.add_section("Mains").expect("add");
        let raw = fs::read_to_string(&fx.data_file).expect("read");
        assert!(raw.ends_with('\n'));
        assert!(raw.contains("\n  "));
    }

    #[test]
    fn test_add_section_trims_and_rejects_duplicates() {
        let fx = fixture();
        fx.store.add_section("  Mains  ").expect("add");
        assert!(matches!(
            fx.store.add_section("Mains"),
            Err(StoreError::Invalid(_))
        ));
        assert!(matches!(
            fx.store.add_section("   "),
            Err(StoreError::Invalid(_))
        ));
    }

    #[test]
    fn test_edit_section_renames_and_retags() {
        let fx = fixture();
        fx.store.add_section("Mains").expect("add");
        fx.store
            .edit_section("Mains", "Grill", Some("special"))
            .expect("edit");

        let catalog = fx.store.load().expect("load");
        let section = catalog.section("Grill").expect("renamed");
        assert_eq!(section.tag, SectionTag::Special);

        assert!(matches!(
            fx.store.edit_section("Gone", "Whatever", None),
            Err(StoreError::SectionNotFound(_))
        ));
    }

    #[test]
    fn test_add_product_allocates_independent_sequences() {
        let fx = fixture();
        fx.store.add_section("Mains").expect("add");
        fx.store.add_section("Specials").expect("add");

        let first = fx
            .store
            .add_product(simple_product("Mains", "Koshari", 10))
            .expect("add");
        assert_eq!(first.as_str(), "P001");
        let second = fx
            .store
            .add_product(simple_product("Mains", "Molokhia", 12))
            .expect("add");
        assert_eq!(second.as_str(), "P002");

        let shortcut = fx.store.add_shortcut(&first, "Specials").expect("shortcut");
        assert_eq!(shortcut.as_str(), "S001");

        // The S sequence never disturbs the P sequence.
        let third = fx
            .store
            .add_product(simple_product("Mains", "Falafel", 6))
            .expect("add");
        assert_eq!(third.as_str(), "P003");
    }

    #[test]
    fn test_add_product_validation_removes_uploaded_images() {
        let fx = fixture();
        fx.store.add_section("Mains").expect("add");

        let input = ProductInput {
            image: Some(jpeg("photo.jpg")),
            ..simple_product("Mains", "", 10)
        };
        assert!(matches!(
            fx.store.add_product(input),
            Err(StoreError::Invalid(_))
        ));
        assert!(image_files(&fx.image_dir).is_empty());

        // Unknown section cleans up the same way.
        let input = ProductInput {
            image: Some(jpeg("photo.jpg")),
            ..simple_product("Nope", "Koshari", 10)
        };
        assert!(matches!(
            fx.store.add_product(input),
            Err(StoreError::SectionNotFound(_))
        ));
        assert!(image_files(&fx.image_dir).is_empty());
    }

    #[test]
    fn test_add_product_filters_and_suffixes_variants() {
        let fx = fixture();
        fx.store.add_section("Drinks").expect("add");

        let input = ProductInput {
            base_size: "Small".to_string(),
            image: Some(jpeg("base.jpg")),
            variants: vec![
                VariantInput {
                    size: String::new(), // dropped: no size
                    price: Decimal::new(5, 0),
                    ..VariantInput::default()
                },
                VariantInput {
                    size: "Large".to_string(),
                    price: Decimal::new(12, 0),
                    image: Some(jpeg("large.jpg")),
                    ..VariantInput::default()
                },
                VariantInput {
                    size: "Huge".to_string(),
                    price: Decimal::ZERO, // dropped: no price
                    ..VariantInput::default()
                },
            ],
            ..simple_product("Drinks", "Juice", 8)
        };
        let id = fx.store.add_product(input).expect("add");

        let catalog = fx.store.load().expect("load");
        let product = catalog.find_product(&id).expect("product");
        assert_eq!(product.variants.len(), 1);
        // The kept variant is index 0, so its file is the `a` slot.
        assert_eq!(product.variants[0].image, "images/p001a.jpg");
        assert_eq!(image_files(&fx.image_dir), vec!["p001.jpg", "p001a.jpg"]);
    }

    #[test]
    fn test_duplicate_variant_sizes_rejected() {
        let fx = fixture();
        fx.store.add_section("Drinks").expect("add");

        let dup = |size: &str| VariantInput {
            size: size.to_string(),
            price: Decimal::new(5, 0),
            ..VariantInput::default()
        };
        let input = ProductInput {
            variants: vec![dup("Large"), dup("Large")],
            ..simple_product("Drinks", "Juice", 0)
        };
        assert!(matches!(
            fx.store.add_product(input),
            Err(StoreError::Invalid(_))
        ));
    }

    #[test]
    fn test_edit_product_rejects_shortcuts() {
        let fx = fixture();
        fx.store.add_section("Mains").expect("add");
        fx.store.add_section("Specials").expect("add");
        let id = fx
            .store
            .add_product(simple_product("Mains", "Koshari", 10))
            .expect("add");
        let shortcut = fx.store.add_shortcut(&id, "Specials").expect("shortcut");

        let edit = ProductEdit {
            name: "Renamed".to_string(),
            price: Decimal::new(10, 0),
            ..ProductEdit::default()
        };
        assert!(matches!(
            fx.store.edit_product(&shortcut, edit),
            Err(StoreError::ShortcutNotEditable(_))
        ));
    }

    #[test]
    fn test_edit_product_replaces_image_without_orphans() {
        let fx = fixture();
        fx.store.add_section("Mains").expect("add");
        let id = fx
            .store
            .add_product(ProductInput {
                image: Some(jpeg("one.jpg")),
                ..simple_product("Mains", "Koshari", 10)
            })
            .expect("add");
        assert_eq!(image_files(&fx.image_dir), vec!["p001.jpg"]);

        let edit = ProductEdit {
            name: "Koshari".to_string(),
            price: Decimal::new(10, 0),
            image: Some(NewImage {
                file_name: "two.png".to_string(),
                content_type: "image/png".to_string(),
                bytes: vec![0x89, 0x50],
            }),
            ..ProductEdit::default()
        };
        fx.store.edit_product(&id, edit).expect("edit");

        // Exactly one file on the stem after the extension change.
        assert_eq!(image_files(&fx.image_dir), vec!["p001.png"]);
        let catalog = fx.store.load().expect("load");
        assert_eq!(
            catalog.find_product(&id).expect("product").image,
            "images/p001.png"
        );
    }

    #[test]
    fn test_edit_product_can_move_sections_and_delete_base_image() {
        let fx = fixture();
        fx.store.add_section("Mains").expect("add");
        fx.store.add_section("Grill").expect("add");
        let id = fx
            .store
            .add_product(ProductInput {
                image: Some(jpeg("one.jpg")),
                ..simple_product("Mains", "Kofta", 15)
            })
            .expect("add");

        let edit = ProductEdit {
            section: "Grill".to_string(),
            name: "Kofta".to_string(),
            price: Decimal::new(15, 0),
            delete_base_image: true,
            ..ProductEdit::default()
        };
        fx.store.edit_product(&id, edit).expect("edit");

        let catalog = fx.store.load().expect("load");
        assert!(catalog.section("Mains").expect("mains").products.is_empty());
        let moved = &catalog.section("Grill").expect("grill").products[0];
        assert_eq!(moved.image, "");
        assert!(image_files(&fx.image_dir).is_empty());

        let edit = ProductEdit {
            section: "Nowhere".to_string(),
            name: "Kofta".to_string(),
            price: Decimal::new(15, 0),
            ..ProductEdit::default()
        };
        assert!(matches!(
            fx.store.edit_product(&id, edit),
            Err(StoreError::SectionNotFound(_))
        ));
    }

    #[test]
    fn test_edit_product_matches_id_case_insensitively() {
        let fx = fixture();
        fx.store.add_section("Mains").expect("add");
        let id = fx
            .store
            .add_product(simple_product("Mains", "Koshari", 10))
            .expect("add");

        let edit = ProductEdit {
            name: "Koshari Deluxe".to_string(),
            price: Decimal::new(12, 0),
            ..ProductEdit::default()
        };
        fx.store
            .edit_product(&ProductId::new("p001"), edit)
            .expect("edit");

        let catalog = fx.store.load().expect("load");
        let product = catalog.find_product(&id).expect("product");
        assert_eq!(product.name, "Koshari Deluxe");
        // The stored spelling survives the lowercase request.
        assert_eq!(product.id.as_str(), "P001");
    }

    #[test]
    fn test_shortcut_is_a_deep_copy_with_its_own_image_file() {
        let fx = fixture();
        fx.store.add_section("Mains").expect("add");
        fx.store.add_section("Specials").expect("add");
        let id = fx
            .store
            .add_product(ProductInput {
                image: Some(jpeg("one.jpg")),
                ..simple_product("Mains", "Koshari", 10)
            })
            .expect("add");

        let shortcut_id = fx.store.add_shortcut(&id, "Specials").expect("shortcut");
        assert_eq!(image_files(&fx.image_dir), vec!["p001.jpg", "s001.jpg"]);

        // Editing the original afterwards leaves the shortcut untouched.
        let edit = ProductEdit {
            name: "Renamed".to_string(),
            price: Decimal::new(99, 0),
            ..ProductEdit::default()
        };
        fx.store.edit_product(&id, edit).expect("edit");

        let catalog = fx.store.load().expect("load");
        let shortcut = catalog.find_product(&shortcut_id).expect("shortcut");
        assert_eq!(shortcut.name, "Koshari");
        assert_eq!(shortcut.price, Decimal::new(10, 0));
        assert_eq!(shortcut.image, "images/s001.jpg");
        assert_eq!(shortcut.shortcut_to, Some(id));
    }

    #[test]
    fn test_add_shortcut_rejects_shortcut_targets() {
        let fx = fixture();
        fx.store.add_section("Mains").expect("add");
        fx.store.add_section("Specials").expect("add");
        let id = fx
            .store
            .add_product(simple_product("Mains", "Koshari", 10))
            .expect("add");
        let shortcut = fx.store.add_shortcut(&id, "Specials").expect("shortcut");

        assert!(matches!(
            fx.store.add_shortcut(&shortcut, "Mains"),
            Err(StoreError::Invalid(_))
        ));
    }

    #[test]
    fn test_delete_product_scopes_image_cleanup() {
        let fx = fixture();
        fx.store.add_section("Mains").expect("add");
        fx.store.add_section("Specials").expect("add");

        let id = fx
            .store
            .add_product(ProductInput {
                image: Some(jpeg("one.jpg")),
                variants: vec![VariantInput {
                    size: "Large".to_string(),
                    price: Decimal::new(15, 0),
                    image: Some(jpeg("two.jpg")),
                    ..VariantInput::default()
                }],
                base_size: "Small".to_string(),
                ..simple_product("Mains", "Koshari", 10)
            })
            .expect("add");
        let shortcut_id = fx.store.add_shortcut(&id, "Specials").expect("shortcut");

        // Deleting the shortcut removes only its own copied file.
        let outcome = fx.store.delete_product(&shortcut_id).expect("delete");
        assert!(outcome.was_shortcut);
        assert_eq!(image_files(&fx.image_dir), vec!["p001.jpg", "p001a.jpg"]);

        // Deleting the original sweeps base and variant files.
        let outcome = fx.store.delete_product(&id).expect("delete");
        assert!(!outcome.was_shortcut);
        assert!(image_files(&fx.image_dir).is_empty());
    }

    #[test]
    fn test_delete_section_cascades_images_but_spares_outside_shortcuts() {
        let fx = fixture();
        fx.store.add_section("Mains").expect("add");
        fx.store.add_section("Specials").expect("add");

        let id = fx
            .store
            .add_product(ProductInput {
                image: Some(jpeg("one.jpg")),
                variants: vec![VariantInput {
                    size: "Large".to_string(),
                    price: Decimal::new(15, 0),
                    image: Some(jpeg("two.jpg")),
                    ..VariantInput::default()
                }],
                base_size: "Small".to_string(),
                ..simple_product("Mains", "Koshari", 10)
            })
            .expect("add");
        fx.store.add_shortcut(&id, "Specials").expect("shortcut");

        let outcome = fx.store.delete_section("Mains").expect("delete");
        assert!(!outcome.failed_image_deletes);

        // The original's whole family is gone; the out-of-section shortcut
        // and its copied file survive.
        assert_eq!(image_files(&fx.image_dir), vec!["s001.jpg"]);
        let catalog = fx.store.load().expect("load");
        assert!(catalog.section("Mains").is_none());
        assert_eq!(catalog.section("Specials").expect("specials").products.len(), 1);
    }

    #[test]
    fn test_reorder_sections_appends_omitted() {
        let fx = fixture();
        for name in ["A", "B", "C"] {
            fx.store.add_section(name).expect("add");
        }

        let catalog = fx
            .store
            .reorder_sections(&["C".to_string(), "A".to_string()])
            .expect("reorder");
        let names: Vec<&str> = catalog
            .sections
            .iter()
            .map(|section| section.name.as_str())
            .collect();
        // The starter section counts too; omitted names keep relative order.
        assert_eq!(names, vec!["C", "A", "New Section", "B"]);
    }

    #[test]
    fn test_reorder_sections_empty_order_keeps_everything() {
        let fx = fixture();
        fx.store.add_section("A").expect("add");
        fx.store.add_section("B").expect("add");

        // Every section is "omitted": a no-op that returns them all.
        let catalog = fx.store.reorder_sections(&[]).expect("reorder");
        let names: Vec<&str> = catalog
            .sections
            .iter()
            .map(|section| section.name.as_str())
            .collect();
        assert_eq!(names, vec!["New Section", "A", "B"]);
    }

    #[test]
    fn test_reorder_products_within_section() {
        let fx = fixture();
        fx.store.add_section("Mains").expect("add");
        for name in ["One", "Two", "Three"] {
            fx.store
                .add_product(simple_product("Mains", name, 10))
                .expect("add");
        }

        let catalog = fx
            .store
            .reorder_products("Mains", &["P003".to_string(), "P001".to_string()])
            .expect("reorder");
        let ids: Vec<&str> = catalog
            .section("Mains")
            .expect("mains")
            .products
            .iter()
            .map(|product| product.id.as_str())
            .collect();
        assert_eq!(ids, vec!["P003", "P001", "P002"]);

        assert!(matches!(
            fx.store.reorder_products("Mains", &[]),
            Err(StoreError::Invalid(_))
        ));
        assert!(matches!(
            fx.store.reorder_products("Nope", &["P001".to_string()]),
            Err(StoreError::SectionNotFound(_))
        ));
    }
}
