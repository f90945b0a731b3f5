use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::Deleted,
    dto::events::{
        CreateEventRequest, CustomerInput, EventList, LiffEvents, LiffEventsRequest,
        UpdateEventRequest,
    },
    entity::{
        customers::{
            ActiveModel as CustomerActive, Column as CustomerCol, Entity as Customers,
            Model as CustomerModel,
        },
        events::{ActiveModel, Column, Entity as Events},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::{Event, require, validate_event_status},
    response::{ApiResponse, Meta},
    routes::params::StatusQuery,
    state::AppState,
};

const DEFAULT_EVENT_STATUS: &str = "draft";
const INVITE_CODE_LEN: usize = 8;

/// Short uppercase code a customer types into the mini-app.
fn invite_code() -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(INVITE_CODE_LEN)
        .collect::<String>()
        .to_uppercase()
}

fn validate_rating(rating: i32) -> AppResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::BadRequest("reviewRating must be between 1 and 5".into()));
    }
    Ok(())
}

/// Events of a LINE user, newest event date first.
pub async fn liff_events(
    state: &AppState,
    payload: LiffEventsRequest,
) -> AppResult<ApiResponse<LiffEvents>> {
    let line_uid = require("lineUid", &payload.line_uid)?;
    let customer = Customers::find()
        .filter(CustomerCol::LineUid.eq(line_uid))
        .one(&state.orm)
        .await?;

    let Some(customer) = customer else {
        return Ok(ApiResponse::success(
            "Events",
            LiffEvents {
                customer: None,
                events: Vec::new(),
            },
            None,
        ));
    };

    let events = Events::find()
        .filter(Column::CustomerId.eq(customer.id))
        .order_by_desc(Column::EventDate)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|event| Event::from_entity(event, Some(customer.clone())))
        .collect();

    Ok(ApiResponse::success(
        "Events",
        LiffEvents {
            customer: Some(customer.into()),
            events,
        },
        None,
    ))
}

pub async fn list_events(
    state: &AppState,
    user: &AuthUser,
    query: StatusQuery,
) -> AppResult<ApiResponse<EventList>> {
    ensure_staff(user)?;
    let (page, limit, offset) = query.pagination().normalize();
    let mut finder = Events::find();
    if let Some(status) = query.status.as_deref().filter(|s| !s.is_empty()) {
        validate_event_status(status)?;
        finder = finder.filter(Column::Status.eq(status));
    }
    let finder = finder.order_by_desc(Column::EventDate);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .find_also_related(Customers)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(event, customer)| Event::from_entity(event, customer))
        .collect();

    Ok(ApiResponse::success(
        "Events",
        EventList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Inserts the customer or refreshes its profile fields, keyed by LINE uid.
async fn upsert_customer<C: ConnectionTrait>(
    conn: &C,
    input: CustomerInput,
) -> AppResult<CustomerModel> {
    let line_uid = require("lineUid", &input.line_uid)?;
    let display_name = require("displayName", &input.display_name)?;

    let existing = Customers::find()
        .filter(CustomerCol::LineUid.eq(line_uid.as_str()))
        .one(conn)
        .await?;
    let customer = match existing {
        Some(found) => {
            let mut active: CustomerActive = found.into();
            active.display_name = Set(display_name);
            if input.picture_url.is_some() {
                active.picture_url = Set(input.picture_url);
            }
            if input.company_name.is_some() {
                active.company_name = Set(input.company_name);
            }
            active.update(conn).await?
        }
        None => {
            CustomerActive {
                id: Set(Uuid::new_v4()),
                line_uid: Set(line_uid),
                display_name: Set(display_name),
                picture_url: Set(input.picture_url),
                company_name: Set(input.company_name),
                created_at: NotSet,
            }
            .insert(conn)
            .await?
        }
    };
    Ok(customer)
}

pub async fn create_event(
    state: &AppState,
    user: &AuthUser,
    payload: CreateEventRequest,
) -> AppResult<ApiResponse<Event>> {
    ensure_staff(user)?;
    let event_name = require("eventName", &payload.event_name)?;
    let status = payload
        .status
        .unwrap_or_else(|| DEFAULT_EVENT_STATUS.to_string());
    validate_event_status(&status)?;

    let txn = state.orm.begin().await?;
    let customer = match payload.customer {
        Some(input) => Some(upsert_customer(&txn, input).await?),
        None => None,
    };

    let event = ActiveModel {
        id: Set(Uuid::new_v4()),
        event_name: Set(event_name),
        event_date: Set(payload.event_date),
        venue: Set(payload.venue),
        status: Set(status),
        invite_code: Set(invite_code()),
        customer_id: Set(customer.as_ref().map(|c| c.id)),
        review_rating: Set(None),
        review_comment: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    tracing::info!(event_id = %event.id, invite_code = %event.invite_code, "event created");
    audit::record(
        state,
        user,
        "event_create",
        "events",
        serde_json::json!({ "event_id": event.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Event created",
        Event::from_entity(event, customer),
        Some(Meta::empty()),
    ))
}

pub async fn update_event(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateEventRequest,
) -> AppResult<ApiResponse<Event>> {
    ensure_staff(user)?;
    let existing = Events::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    if let Some(event_name) = payload.event_name {
        active.event_name = Set(require("eventName", &event_name)?);
    }
    if let Some(event_date) = payload.event_date {
        active.event_date = Set(event_date);
    }
    if let Some(venue) = payload.venue {
        active.venue = Set(Some(venue));
    }
    if let Some(status) = payload.status {
        validate_event_status(&status)?;
        active.status = Set(status);
    }
    match payload.review_rating {
        Some(Some(rating)) => {
            validate_rating(rating)?;
            active.review_rating = Set(Some(rating));
        }
        Some(None) => {
            active.review_rating = Set(None);
            active.review_comment = Set(None);
        }
        None => {}
    }
    if let Some(comment) = payload.review_comment {
        active.review_comment = Set(Some(comment));
    }
    active.updated_at = Set(Utc::now().into());

    let event = active.update(&state.orm).await?;
    let customer = match event.customer_id {
        Some(customer_id) => Customers::find_by_id(customer_id).one(&state.orm).await?,
        None => None,
    };

    audit::record(
        state,
        user,
        "event_update",
        "events",
        serde_json::json!({ "event_id": event.id, "status": event.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Event::from_entity(event, customer),
        Some(Meta::empty()),
    ))
}

pub async fn delete_event(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Deleted>> {
    ensure_staff(user)?;
    let result = Events::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        state,
        user,
        "event_delete",
        "events",
        serde_json::json!({ "event_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        Deleted::new(id),
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invite_codes_are_short_uppercase_hex() {
        let code = invite_code();
        assert_eq!(code.len(), INVITE_CODE_LEN);
        assert!(code.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        assert_ne!(code, invite_code());
    }

    #[test]
    fn rating_must_be_one_to_five() {
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
    }
}
