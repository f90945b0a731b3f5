use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        Deleted,
        events::{CreateEventRequest, EventList, UpdateEventRequest},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Event,
    response::ApiResponse,
    routes::params::StatusQuery,
    services::event_service,
    state::AppState,
};

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/{id}", put(update_event).delete(delete_event))
}

#[utoipa::path(
    get,
    path = "/api/admin/events",
    params(StatusQuery),
    responses(
        (status = 200, description = "Events, newest event date first", body = ApiResponse<EventList>),
        (status = 400, description = "Unknown status filter")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_events(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<StatusQuery>,
) -> AppResult<Json<ApiResponse<EventList>>> {
    let resp = event_service::list_events(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/events",
    request_body = CreateEventRequest,
    responses(
        (status = 200, description = "Create event, upserting the customer", body = ApiResponse<Event>),
        (status = 400, description = "Bad request")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_event(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateEventRequest>,
) -> AppResult<Json<ApiResponse<Event>>> {
    let resp = event_service::create_event(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/events/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Update event status or review", body = ApiResponse<Event>),
        (status = 400, description = "Invalid status or rating"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEventRequest>,
) -> AppResult<Json<ApiResponse<Event>>> {
    let resp = event_service::update_event(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/events/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Delete event", body = ApiResponse<Deleted>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    let resp = event_service::delete_event(&state, &user, id).await?;
    Ok(Json(resp))
}
