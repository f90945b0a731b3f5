use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Customer, Event};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LiffEventsRequest {
    pub line_uid: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LiffEvents {
    pub customer: Option<Customer>,
    pub events: Vec<Event>,
}

/// LINE profile attached to an event by staff.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    pub line_uid: String,
    pub display_name: String,
    pub picture_url: Option<String>,
    pub company_name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub event_name: String,
    pub event_date: NaiveDate,
    pub venue: Option<String>,
    pub status: Option<String>,
    pub customer: Option<CustomerInput>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub event_name: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub venue: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<i32>, nullable)]
    pub review_rating: Option<Option<i32>>,
    pub review_comment: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EventList {
    pub items: Vec<Event>,
}
