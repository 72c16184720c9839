//! Validate a catalog document against its invariants.
//!
//! Unlike the serving path, which degrades tolerantly (bad JSON becomes a
//! starter catalog, malformed ids are skipped during allocation), `check`
//! is strict: it exists to surface exactly the problems the tolerant path
//! papers over.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::{info, warn};

use mezze_core::{Catalog, IdPrefix, Product};

/// Validate `data_file` and its image directory, reporting every problem
/// found.
///
/// # Errors
///
/// Returns an error when the document cannot be read or parsed, or when
/// any invariant is violated. Orphaned image files are warnings only.
pub fn run(data_file: &Path, image_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let raw = fs::read_to_string(data_file)
        .map_err(|e| format!("cannot read {}: {e}", data_file.display()))?;
    let catalog: Catalog =
        serde_json::from_str(&raw).map_err(|e| format!("document is not valid JSON: {e}"))?;

    let problems = check_catalog(&catalog, image_dir);
    let orphans = find_orphans(&catalog, image_dir);

    for orphan in &orphans {
        warn!("orphaned image file: {orphan}");
    }
    for problem in &problems {
        tracing::error!("{problem}");
    }

    info!(
        sections = catalog.sections.len(),
        products = catalog.products().count(),
        problems = problems.len(),
        orphans = orphans.len(),
        "Check complete"
    );

    if problems.is_empty() {
        Ok(())
    } else {
        Err(format!("{} problem(s) found", problems.len()).into())
    }
}

/// Every invariant violation in the document, as human-readable strings.
fn check_catalog(catalog: &Catalog, image_dir: &Path) -> Vec<String> {
    let mut problems = Vec::new();

    let mut section_names = HashSet::new();
    for section in &catalog.sections {
        if !section_names.insert(section.name.as_str()) {
            problems.push(format!("duplicate section name: {}", section.name));
        }
    }

    let mut seen_ids = HashSet::new();
    for product in catalog.products() {
        let id = &product.id;

        match id.validate() {
            Ok((prefix, _)) => {
                let is_marked_shortcut = product.shortcut_to.is_some();
                if (prefix == IdPrefix::Shortcut) != is_marked_shortcut {
                    problems.push(format!(
                        "{id}: prefix and shortcut_to marker disagree"
                    ));
                }
            }
            Err(error) => problems.push(format!("invalid id {id:?}: {error}")),
        }

        if !seen_ids.insert(id.normalized()) {
            problems.push(format!("duplicate id: {id}"));
        }

        if product.name.trim().is_empty() {
            problems.push(format!("{id}: product has no name"));
        }
        if !product.has_price_source() {
            problems.push(format!("{id}: neither a positive price nor a variant"));
        }

        let mut sizes = HashSet::new();
        for variant in &product.variants {
            if variant.size.trim().is_empty() {
                problems.push(format!("{id}: variant with empty size"));
            }
            if !sizes.insert(variant.size.as_str()) {
                problems.push(format!("{id}: duplicate variant size {:?}", variant.size));
            }
        }

        if let Some(target) = &product.shortcut_to {
            match catalog.find_product(target) {
                Some(original) if original.id.is_shortcut() => {
                    problems.push(format!("{id}: shortcut target {target} is itself a shortcut"));
                }
                Some(_) => {}
                None => problems.push(format!("{id}: shortcut target {target} does not exist")),
            }
        }

        for path in referenced_images(product) {
            if !image_exists(image_dir, path) {
                problems.push(format!("{id}: missing image file {path}"));
            }
        }
    }

    problems
}

/// Image files in the directory that no product references.
fn find_orphans(catalog: &Catalog, image_dir: &Path) -> Vec<String> {
    let referenced: HashSet<&str> = catalog
        .products()
        .flat_map(referenced_images)
        .filter_map(basename)
        .collect();

    let Ok(entries) = fs::read_dir(image_dir) else {
        return Vec::new();
    };
    let mut orphans: Vec<String> = entries
        .flatten()
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().to_str().map(String::from))
        .filter(|name| !referenced.contains(name.as_str()))
        .collect();
    orphans.sort();
    orphans
}

fn referenced_images(product: &Product) -> impl Iterator<Item = &str> {
    std::iter::once(product.image.as_str())
        .chain(product.variants.iter().map(|variant| variant.image.as_str()))
        .filter(|path| !path.is_empty())
}

fn image_exists(image_dir: &Path, relative: &str) -> bool {
    basename(relative).is_some_and(|name| image_dir.join(name).is_file())
}

fn basename(relative: &str) -> Option<&str> {
    relative.rsplit('/').next().filter(|name| !name.is_empty())
}
