//! The catalog's sibling image directory.
//!
//! Filename convention: a product's base image is stored as
//! `{prefix-letter}{number}.{ext}` (`p007.jpg`), and variant N (0-indexed
//! among kept variants) appends a letter suffix (`p007a.png`). Any upload
//! to a slot first deletes *all* files matching that stem regardless of
//! extension — that is how extension changes on re-upload avoid leaving
//! orphans behind.
//!
//! Deletes are best-effort: a failed unlink is logged and reported as a
//! warning, never an abort. The one exception is the shortcut image copy,
//! whose failure aborts the surrounding operation.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use mezze_core::ProductId;

/// File extensions accepted for uploads.
const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Prefix the stored relative paths carry in the catalog document.
const RELATIVE_PREFIX: &str = "images/";

/// Errors from image operations.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The uploaded filename has no usable image extension.
    #[error("unsupported image file type: {0:?}")]
    UnsupportedExtension(String),

    /// The upload's content type is not `image/*`.
    #[error("upload is not an image (content type {0:?})")]
    NotAnImage(String),

    /// The product id yields no usable filename stem.
    #[error("product id {0:?} has no usable image filename stem")]
    BadId(String),

    /// Writing the uploaded bytes failed.
    #[error("failed to store image: {0}")]
    Io(#[from] std::io::Error),

    /// Copying an original's image for a shortcut failed. This one aborts
    /// the whole shortcut creation.
    #[error("failed to copy image for shortcut: {0}")]
    CopyFailed(std::io::Error),
}

/// An uploaded image, straight out of the multipart body.
#[derive(Debug, Clone)]
pub struct NewImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl NewImage {
    /// Browsers submit unselected file inputs as parts with an empty
    /// filename; those placeholders keep positional alignment but carry
    /// nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.file_name.is_empty() || self.bytes.is_empty()
    }
}

/// Manages the image directory next to the catalog document.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory images live in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store an upload under a product's base slot (`variant_index: None`)
    /// or a variant slot. Validates the extension and content type, then
    /// pre-deletes every file on the slot's stem before writing.
    ///
    /// Returns the relative path to store in the document.
    ///
    /// # Errors
    ///
    /// Rejects non-image uploads; propagates filesystem failures.
    pub fn store(
        &self,
        upload: &NewImage,
        id: &ProductId,
        variant_index: Option<usize>,
    ) -> Result<String, ImageError> {
        let extension = Path::new(&upload.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| ImageError::UnsupportedExtension(upload.file_name.clone()))?;
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ImageError::UnsupportedExtension(upload.file_name.clone()));
        }
        if !upload.content_type.starts_with("image/") {
            return Err(ImageError::NotAnImage(upload.content_type.clone()));
        }

        let stem = self.stem(id, variant_index)?;
        self.delete_by_stem(&stem);

        fs::create_dir_all(&self.dir)?;
        let filename = format!("{stem}.{extension}");
        fs::write(self.dir.join(&filename), &upload.bytes)?;
        Ok(format!("{RELATIVE_PREFIX}{filename}"))
    }

    /// Copy an original's base image for a new shortcut, keeping the
    /// extension but renaming to the shortcut's own stem (`s005.jpg`).
    ///
    /// A missing source file yields `Ok(None)` (the shortcut just has no
    /// image); a failed copy is an error and must abort the creation.
    ///
    /// # Errors
    ///
    /// [`ImageError::CopyFailed`] when the filesystem copy fails.
    pub fn copy_for_shortcut(
        &self,
        original_relative: &str,
        shortcut_id: &ProductId,
    ) -> Result<Option<String>, ImageError> {
        let Some(basename) = safe_basename(original_relative) else {
            return Ok(None);
        };
        let source = self.dir.join(basename);
        if !source.is_file() {
            return Ok(None);
        }

        let extension = Path::new(basename)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("jpg");
        let stem = self.stem(shortcut_id, None)?;
        let filename = format!("{stem}.{extension}");
        fs::copy(&source, self.dir.join(&filename)).map_err(ImageError::CopyFailed)?;
        Ok(Some(format!("{RELATIVE_PREFIX}{filename}")))
    }

    /// Delete every file whose name is `{stem}.{anything}`. Returns false
    /// if any existing file could not be removed.
    pub fn delete_by_stem(&self, stem: &str) -> bool {
        let prefix = format!("{stem}.");
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return true;
        };

        let mut all_deleted = true;
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with(&prefix) && entry.path().is_file() {
                if let Err(error) = fs::remove_file(entry.path()) {
                    tracing::warn!(file = name, %error, "failed to delete image");
                    all_deleted = false;
                }
            }
        }
        all_deleted
    }

    /// Delete an original product's entire image family: the base stem and
    /// every single-letter variant stem (`p001.*`, `p001a.*` .. `p001z.*`).
    pub fn delete_all_for(&self, id: &ProductId) -> bool {
        let Some(base) = id.image_stem() else {
            return true;
        };
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return true;
        };

        let mut all_deleted = true;
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(rest) = name.strip_prefix(&base) else {
                continue;
            };
            let is_family = rest.starts_with('.')
                || (rest
                    .chars()
                    .next()
                    .is_some_and(|suffix| suffix.is_ascii_lowercase())
                    && rest.get(1..2) == Some("."));
            if is_family && entry.path().is_file() {
                if let Err(error) = fs::remove_file(entry.path()) {
                    tracing::warn!(file = name, %error, "failed to delete image");
                    all_deleted = false;
                }
            }
        }
        all_deleted
    }

    /// Delete one specific file by its stored relative path (shortcut
    /// images are copies and die alone). A missing file counts as
    /// success.
    pub fn delete_relative(&self, relative: &str) -> bool {
        let Some(basename) = safe_basename(relative) else {
            return true;
        };
        let path = self.dir.join(basename);
        if !path.is_file() {
            return true;
        }
        match fs::remove_file(&path) {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(file = basename, %error, "failed to delete image");
                false
            }
        }
    }

    fn stem(&self, id: &ProductId, variant_index: Option<usize>) -> Result<String, ImageError> {
        let stem = match variant_index {
            None => id.image_stem(),
            Some(index) => id.variant_stem(index),
        };
        stem.ok_or_else(|| ImageError::BadId(id.to_string()))
    }
}

/// The final path component, rejecting traversal attempts.
fn safe_basename(relative: &str) -> Option<&str> {
    let basename = relative.rsplit(['/', '\\']).next()?;
    if basename.is_empty() || basename.contains("..") {
        return None;
    }
    Some(basename)
}
