use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Design, Portfolio};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePortfolioRequest {
    pub title: String,
    pub category: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub status: Option<String>,
    pub order: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePortfolioRequest {
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub removed_images: Vec<String>,
    pub status: Option<String>,
    pub order: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PortfolioList {
    pub items: Vec<Portfolio>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSaved {
    pub portfolio: Portfolio,
    pub cleanup_failures: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDesignRequest {
    pub title: String,
    pub category: Option<String>,
    pub image: Option<String>,
    pub status: Option<String>,
    pub order: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDesignRequest {
    pub title: Option<String>,
    pub category: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub image: Option<Option<String>>,
    pub status: Option<String>,
    pub order: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DesignList {
    pub items: Vec<Design>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DesignSaved {
    pub design: Design,
    /// The replaced image, when its file could not be deleted.
    pub cleanup_failures: Vec<String>,
}
