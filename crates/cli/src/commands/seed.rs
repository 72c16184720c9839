//! Write a fresh starter catalog document.

use std::fs;
use std::path::Path;

use tracing::info;

use mezze_core::Catalog;

/// Write the starter catalog (one empty "New Section") to `data_file`.
///
/// # Errors
///
/// Refuses to overwrite an existing document unless `force` is set;
/// propagates filesystem failures.
pub fn run(data_file: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if data_file.exists() && !force {
        return Err(format!(
            "{} already exists (pass --force to overwrite)",
            data_file.display()
        )
        .into());
    }

    if let Some(parent) = data_file.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut body = serde_json::to_string_pretty(&Catalog::starter())?;
    body.push('\n');
    fs::write(data_file, body)?;

    info!(path = %data_file.display(), "Starter catalog written");
    Ok(())
}
