use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{BreadcrumbItem, Category, CategoryWithCounts, Product};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub parent_id: Option<Uuid>,
    pub status: Option<String>,
    pub order: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    /// `null` moves the category to the root level.
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<Uuid>, nullable)]
    pub parent_id: Option<Option<Uuid>>,
    pub status: Option<String>,
    pub order: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryList {
    pub items: Vec<CategoryWithCounts>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryTreeNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<Category>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryTree {
    pub items: Vec<CategoryTreeNode>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDeleted {
    pub id: Uuid,
    pub deleted_products: u64,
    /// Image URLs of the deleted products whose files could not be removed.
    pub cleanup_failures: Vec<String>,
}

/// Everything the storefront needs to render one category page.
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryPage {
    pub category: Category,
    pub children: Vec<Category>,
    pub products: Vec<Product>,
    pub breadcrumb: Vec<BreadcrumbItem>,
}
