//! The action-dispatch HTTP API.
//!
//! The whole CMS is one endpoint: `GET /api?action=get_data` returns the
//! raw catalog document, and `POST /api` takes a multipart form whose
//! `action` field selects the mutation. The editor frontends submit
//! parallel positional arrays for variant rows (`variant_name[]`,
//! `variant_price[]`, ...), with unselected file inputs arriving as
//! empty-filename parts that must be kept as placeholders so the arrays
//! stay aligned.

use std::collections::HashMap;

use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::routing::get;
use axum::Router;
use rust_decimal::Decimal;
use serde::Serialize;

use mezze_core::{price, Catalog, ProductId};

use crate::error::AppError;
use crate::state::AppState;
use crate::store::{NewImage, ProductEdit, ProductInput, StoreError, VariantEdit, VariantInput};

/// Uploads are product photos; 10 MiB is well past anything the editors
/// produce.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// The response envelope every action answers with.
#[derive(Debug, Serialize)]
struct ApiResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    product_id: Option<ProductId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shortcut_id: Option<ProductId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Catalog>,
}

impl ApiResponse {
    fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            product_id: None,
            shortcut_id: None,
            data: None,
        }
    }

    fn with_product_id(mut self, id: ProductId) -> Self {
        self.product_id = Some(id);
        self
    }

    fn with_shortcut_id(mut self, id: ProductId) -> Self {
        self.shortcut_id = Some(id);
        self
    }

    fn with_data(mut self, catalog: Catalog) -> Self {
        self.data = Some(catalog);
        self
    }
}

/// The CMS API routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api", get(handle_get).post(handle_post))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// `GET /api?action=get_data` - the only read.
async fn handle_get(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Catalog>, AppError> {
    match params.get("action").map(String::as_str) {
        Some("get_data") => Ok(Json(state.store().load()?)),
        Some(action) => Err(AppError::UnknownAction(action.to_string())),
        None => Err(AppError::MissingAction),
    }
}

/// `POST /api` - every mutation, selected by the `action` field.
async fn handle_post(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ApiResponse>, AppError> {
    let form = CmsForm::read(multipart).await?;
    let store = state.store();

    let action = form.first("action").ok_or(AppError::MissingAction)?;
    tracing::debug!(action, "cms action");

    let response = match action {
        "add_section" => {
            store.add_section(form.first_or_default("section_name"))?;
            ApiResponse::message("Section added successfully")
        }
        "edit_section" => {
            store.edit_section(
                form.first_or_default("old_name"),
                form.first_or_default("new_name"),
                form.first("new_tag"),
            )?;
            ApiResponse::message("Section updated successfully")
        }
        "delete_section" => {
            let outcome = store.delete_section(form.first_or_default("section_name"))?;
            ApiResponse::message(with_image_warning(
                "Section deleted successfully",
                outcome.failed_image_deletes,
            ))
        }
        "reorder_sections" => {
            let catalog = store.reorder_sections(&form.order("new_order"))?;
            ApiResponse::message("Sections reordered successfully").with_data(catalog)
        }
        "reorder_products" => {
            let order = form.order("new_order");
            let catalog = store.reorder_products(form.first_or_default("section_name"), &order)?;
            ApiResponse::message("Products reordered successfully").with_data(catalog)
        }
        "add_product" => {
            let id = store.add_product(form.product_input())?;
            ApiResponse::message("Product added successfully").with_product_id(id)
        }
        "edit_product" => {
            let id = form.product_id("product_id")?;
            store.edit_product(&id, form.product_edit())?;
            ApiResponse::message("Product updated successfully")
        }
        "add_shortcut" => {
            let target = form.product_id("target_product_id")?;
            let id = store.add_shortcut(&target, form.first_or_default("target_section_name"))?;
            ApiResponse::message("Shortcut added successfully").with_shortcut_id(id)
        }
        "delete_product" => {
            let id = form.product_id("product_id")?;
            let outcome = store.delete_product(&id)?;
            let base = if outcome.was_shortcut {
                "Shortcut deleted successfully"
            } else {
                "Product deleted successfully"
            };
            ApiResponse::message(with_image_warning(base, outcome.failed_image_deletes))
        }
        other => return Err(AppError::UnknownAction(other.to_string())),
    };

    Ok(Json(response))
}

fn with_image_warning(base: &str, failed: bool) -> String {
    if failed {
        format!("{base} (some image files could not be deleted)")
    } else {
        base.to_string()
    }
}

/// The decoded multipart form: text fields and file fields, each keyed by
/// name with the `[]` array suffix stripped, values in submission order.
#[derive(Debug, Default)]
struct CmsForm {
    fields: HashMap<String, Vec<String>>,
    files: HashMap<String, Vec<NewImage>>,
}

impl CmsForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default();
            let name = name.strip_suffix("[]").unwrap_or(name).to_string();

            if let Some(file_name) = field.file_name() {
                // Empty-filename parts are kept: they pad the positional
                // variant arrays.
                let file_name = file_name.to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await?.to_vec();
                form.files.entry(name).or_default().push(NewImage {
                    file_name,
                    content_type,
                    bytes,
                });
            } else {
                let value = field.text().await?;
                form.fields.entry(name).or_default().push(value);
            }
        }
        Ok(form)
    }

    fn first(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    fn first_or_default(&self, key: &str) -> &str {
        self.first(key).unwrap_or_default()
    }

    fn all(&self, key: &str) -> &[String] {
        self.fields.get(key).map_or(&[], Vec::as_slice)
    }

    fn text_at(&self, key: &str, index: usize) -> String {
        self.all(key).get(index).cloned().unwrap_or_default()
    }

    fn flag_at(&self, key: &str, index: usize) -> bool {
        self.all(key).get(index).is_some_and(|value| value == "true")
    }

    fn price(&self, key: &str) -> Decimal {
        price::coerce_raw(self.first_or_default(key))
    }

    fn price_at(&self, key: &str, index: usize) -> Decimal {
        price::coerce_raw(&self.text_at(key, index))
    }

    fn file(&self, key: &str) -> Option<NewImage> {
        self.files
            .get(key)
            .and_then(|uploads| uploads.first())
            .filter(|upload| !upload.is_empty())
            .cloned()
    }

    fn file_at(&self, key: &str, index: usize) -> Option<NewImage> {
        self.files
            .get(key)
            .and_then(|uploads| uploads.get(index))
            .filter(|upload| !upload.is_empty())
            .cloned()
    }

    fn product_id(&self, key: &str) -> Result<ProductId, AppError> {
        let id = self.first_or_default(key);
        if id.is_empty() {
            return Err(StoreError::Invalid("Product ID is required".to_string()).into());
        }
        Ok(ProductId::new(id))
    }

    /// A reorder payload is a JSON array string in a text field. Missing or
    /// unparseable input decodes as an empty list; the store decides
    /// whether that is acceptable for the operation.
    fn order(&self, key: &str) -> Vec<String> {
        serde_json::from_str(self.first_or_default(key)).unwrap_or_default()
    }

    fn product_input(&self) -> ProductInput {
        ProductInput {
            section: self.first_or_default("section_name").to_string(),
            name: self.first_or_default("name").to_string(),
            price: self.price("price"),
            description: self.first_or_default("description").to_string(),
            base_size: self.first_or_default("base_size").to_string(),
            image: self.file("image"),
            variants: (0..self.all("variant_name").len())
                .map(|index| VariantInput {
                    size: self.text_at("variant_name", index),
                    price: self.price_at("variant_price", index),
                    description: self.text_at("variant_description", index),
                    image: self.file_at("variant_image_file", index),
                })
                .collect(),
        }
    }

    fn product_edit(&self) -> ProductEdit {
        ProductEdit {
            section: self.first_or_default("section_name").to_string(),
            name: self.first_or_default("name").to_string(),
            price: self.price("price"),
            description: self.first_or_default("description").to_string(),
            base_size: self.first_or_default("base_size").to_string(),
            image: self.file("image"),
            delete_base_image: self.first("delete_base_image") == Some("true"),
            variants: (0..self.all("variant_name").len())
                .map(|index| VariantEdit {
                    size: self.text_at("variant_name", index),
                    price: self.price_at("variant_price", index),
                    description: self.text_at("variant_description", index),
                    old_image: self.text_at("variant_old_image", index),
                    delete_image: self.flag_at("variant_delete_image", index),
                    image: self.file_at("variant_image_file", index),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_with(fields: &[(&str, &[&str])]) -> CmsForm {
        let mut form = CmsForm::default();
        for (key, values) in fields {
            form.fields.insert(
                (*key).to_string(),
                values.iter().map(|v| (*v).to_string()).collect(),
            );
        }
        form
    }

    #[test]
    fn test_order_parses_json_array() {
        let form = form_with(&[("new_order", &[r#"["C","A"]"#])]);
        assert_eq!(
            form.order("new_order"),
            vec!["C".to_string(), "A".to_string()]
        );

        // Missing or unparseable input is an empty list, not a failure.
        let form = form_with(&[("new_order", &["not json"])]);
        assert!(form.order("new_order").is_empty());
        assert!(CmsForm::default().order("new_order").is_empty());
    }

    #[test]
    fn test_product_input_zips_variant_arrays() {
        let form = form_with(&[
            ("section_name", &["Drinks"]),
            ("name", &["Juice"]),
            ("price", &["8.5"]),
            ("variant_name", &["Large", "Huge"]),
            ("variant_price", &["12", "garbage"]),
            ("variant_description", &["a full litre"]),
        ]);

        let input = form.product_input();
        assert_eq!(input.price, Decimal::new(85, 1));
        assert_eq!(input.variants.len(), 2);
        assert_eq!(input.variants[0].size, "Large");
        assert_eq!(input.variants[0].price, Decimal::new(12, 0));
        assert_eq!(input.variants[0].description, "a full litre");
        // Ragged arrays pad with defaults instead of failing.
        assert_eq!(input.variants[1].price, Decimal::ZERO);
        assert_eq!(input.variants[1].description, "");
    }

    #[test]
    fn test_product_edit_reads_flags() {
        let form = form_with(&[
            ("name", &["Juice"]),
            ("price", &["8"]),
            ("delete_base_image", &["true"]),
            ("variant_name", &["Large"]),
            ("variant_price", &["12"]),
            ("variant_delete_image", &["false"]),
            ("variant_old_image", &["images/p001a.jpg"]),
        ]);

        let edit = form.product_edit();
        assert!(edit.delete_base_image);
        assert!(!edit.variants[0].delete_image);
        assert_eq!(edit.variants[0].old_image, "images/p001a.jpg");
    }

    #[test]
    fn test_missing_product_id_is_rejected() {
        assert!(CmsForm::default().product_id("product_id").is_err());
    }
}
