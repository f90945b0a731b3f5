use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{models::Product, storage::UploadReport};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    /// Derived from the name when omitted.
    pub slug: Option<String>,
    pub category_id: Uuid,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub price_unit: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub order: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub category_id: Option<Uuid>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub price: Option<Option<Decimal>>,
    pub price_unit: Option<String>,
    /// Final ordered image list. Stored images missing from it are deleted after saving.
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub removed_images: Vec<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub order: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSaved {
    pub product: Product,
    /// Removed image URLs whose files could not be deleted.
    pub cleanup_failures: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductImagesResult {
    /// The product after attaching the new images; absent when nothing was committed.
    pub product: Option<Product>,
    pub report: UploadReport,
}
