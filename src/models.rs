use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::{blogs, categories, customers, designs, events, portfolios, products, promotions, users},
    error::AppError,
};

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_INACTIVE: &str = "inactive";

pub const BLOG_DRAFT: &str = "draft";
pub const BLOG_PUBLISHED: &str = "published";

pub const EVENT_STATUSES: [&str; 5] = ["draft", "confirmed", "in-progress", "completed", "cancelled"];
pub const USER_ROLES: [&str; 3] = ["admin", "sales", "user"];

pub fn validate_status(status: &str) -> Result<(), AppError> {
    if status == STATUS_ACTIVE || status == STATUS_INACTIVE {
        Ok(())
    } else {
        Err(AppError::BadRequest("status must be active or inactive".into()))
    }
}

pub fn validate_blog_status(status: &str) -> Result<(), AppError> {
    if status == BLOG_DRAFT || status == BLOG_PUBLISHED {
        Ok(())
    } else {
        Err(AppError::BadRequest("status must be draft or published".into()))
    }
}

pub fn validate_event_status(status: &str) -> Result<(), AppError> {
    if EVENT_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(AppError::BadRequest("Invalid event status".into()))
    }
}

pub fn validate_role(role: &str) -> Result<(), AppError> {
    if USER_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(AppError::BadRequest("role must be admin, sales or user".into()))
    }
}

/// Rejects blank values for a required text field, returning the trimmed value.
pub fn require(field: &str, value: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// Lowercases and checks a slug against `[a-z0-9-]+`.
pub fn normalize_slug(slug: &str) -> Result<String, AppError> {
    let slug = slug.trim().to_lowercase();
    let valid = !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid {
        return Err(AppError::BadRequest(
            "slug must contain only a-z, 0-9 and inner dashes".into(),
        ));
    }
    Ok(slug)
}

/// Builds a slug from free text: ASCII letters and digits kept, runs of
/// anything else collapsed into single dashes.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Slug derived from a display name. Names without latin letters or digits
/// (Thai product names, for one) need an explicit slug.
pub fn slug_from_name(name: &str) -> Result<String, AppError> {
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(AppError::BadRequest(format!(
            "cannot derive a slug from name '{name}', provide a slug"
        )));
    }
    normalize_slug(&slug)
}

/// Image lists are stored as JSON text. Unreadable text yields an empty list.
pub fn parse_images(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "stored image list is not valid JSON");
        Vec::new()
    })
}

pub fn encode_images(images: &[String]) -> String {
    serde_json::to_string(images).unwrap_or_else(|_| "[]".to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub parent_id: Option<Uuid>,
    pub status: String,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            description: model.description,
            image: model.image,
            parent_id: model.parent_id,
            status: model.status,
            order: model.sort_order,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithCounts {
    #[serde(flatten)]
    pub category: Category,
    pub child_count: i64,
    pub product_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct BreadcrumbItem {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub category_id: Uuid,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub price_unit: Option<String>,
    pub images: Vec<String>,
    pub description: Option<String>,
    pub status: String,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self {
            images: parse_images(&model.images),
            id: model.id,
            name: model.name,
            slug: model.slug,
            category_id: model.category_id,
            price: model.price,
            price_unit: model.price_unit,
            description: model.description,
            status: model.status,
            order: model.sort_order,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub status: String,
    pub order: i32,
    pub likes: i32,
    pub views: i32,
    pub created_at: DateTime<Utc>,
}

impl From<portfolios::Model> for Portfolio {
    fn from(model: portfolios::Model) -> Self {
        Self {
            images: parse_images(&model.images),
            id: model.id,
            title: model.title,
            category: model.category,
            description: model.description,
            status: model.status,
            order: model.sort_order,
            likes: model.likes,
            views: model.views,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Design {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub image: Option<String>,
    pub status: String,
    pub order: i32,
    pub likes: i32,
    pub views: i32,
    pub created_at: DateTime<Utc>,
}

impl From<designs::Model> for Design {
    fn from(model: designs::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            category: model.category,
            image: model.image,
            status: model.status,
            order: model.sort_order,
            likes: model.likes,
            views: model.views,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

/// Likes and views after a counter update.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Counters {
    pub likes: i32,
    pub views: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: String,
    pub order: i32,
    pub created_at: DateTime<Utc>,
}

impl From<promotions::Model> for Promotion {
    fn from(model: promotions::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            image: model.image,
            start_date: model.start_date,
            end_date: model.end_date,
            status: model.status,
            order: model.sort_order,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub cover_image: Option<String>,
    pub author: Option<String>,
    pub status: String,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<blogs::Model> for Blog {
    fn from(model: blogs::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            slug: model.slug,
            excerpt: model.excerpt,
            content: model.content,
            cover_image: model.cover_image,
            author: model.author,
            status: model.status,
            published_at: model.published_at.map(|dt| dt.with_timezone(&Utc)),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub display_name: String,
    pub picture_url: Option<String>,
    pub line_uid: String,
    pub company_name: Option<String>,
}

impl From<customers::Model> for Customer {
    fn from(model: customers::Model) -> Self {
        Self {
            id: model.id,
            display_name: model.display_name,
            picture_url: model.picture_url,
            line_uid: model.line_uid,
            company_name: model.company_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Review {
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub event_name: String,
    pub event_date: NaiveDate,
    pub venue: Option<String>,
    pub status: String,
    pub invite_code: String,
    pub customer: Option<Customer>,
    pub review: Option<Review>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn from_entity(model: events::Model, customer: Option<customers::Model>) -> Self {
        let review = model.review_rating.map(|rating| Review {
            rating,
            comment: model.review_comment.clone(),
        });
        Self {
            id: model.id,
            event_name: model.event_name,
            event_date: model.event_date,
            venue: model.venue,
            status: model.status,
            invite_code: model.invite_code,
            customer: customer.map(Customer::from),
            review,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub position: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            role: model.role,
            position: model.position,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(transparent)]
pub struct SiteSettings {
    pub values: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_is_lowercased_and_trimmed() {
        assert_eq!(normalize_slug("  LED-Screen ").unwrap(), "led-screen");
    }

    #[test]
    fn slug_rejects_spaces_slashes_and_edge_dashes() {
        assert!(normalize_slug("led screen").is_err());
        assert!(normalize_slug("led/indoor").is_err());
        assert!(normalize_slug("-led").is_err());
        assert!(normalize_slug("").is_err());
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  LED Screen / Indoor  "), "led-screen-indoor");
        assert_eq!(slugify("P3.9 Panel!"), "p3-9-panel");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn name_without_latin_letters_asks_for_a_slug() {
        assert_eq!(slug_from_name("P3.9 LED Panel").unwrap(), "p3-9-led-panel");
        match slug_from_name("จอ แอลอีดี") {
            Err(AppError::BadRequest(msg)) => assert!(msg.contains("provide a slug"), "{msg}"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn image_list_survives_storage_encoding() {
        let images = vec!["/uploads/products/a.jpg".to_string(), "/uploads/products/b.png".to_string()];
        assert_eq!(parse_images(&encode_images(&images)), images);
    }

    #[test]
    fn unreadable_image_text_is_empty() {
        assert!(parse_images("not json").is_empty());
        assert!(parse_images("").is_empty());
    }

    #[test]
    fn event_status_is_a_closed_set() {
        assert!(validate_event_status("in-progress").is_ok());
        assert!(validate_event_status("in_progress").is_err());
        assert!(validate_event_status("archived").is_err());
    }

    #[test]
    fn role_is_a_closed_set() {
        assert!(validate_role("sales").is_ok());
        assert!(validate_role("superuser").is_err());
    }

    #[test]
    fn required_fields_reject_blank_values() {
        assert!(require("name", "   ").is_err());
        assert_eq!(require("name", " Stage ").unwrap(), "Stage");
    }
}
