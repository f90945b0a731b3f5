use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::{
        events::{LiffEvents, LiffEventsRequest},
        promotions::PromotionList,
    },
    error::AppResult,
    response::ApiResponse,
    services::{event_service, promotion_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", post(liff_events))
        .route("/promotions", get(liff_promotions))
}

#[utoipa::path(
    post,
    path = "/api/liff/events",
    request_body = LiffEventsRequest,
    responses(
        (status = 200, description = "Customer profile and events for a LINE user", body = ApiResponse<LiffEvents>),
        (status = 400, description = "lineUid missing")
    ),
    tag = "LIFF"
)]
pub async fn liff_events(
    State(state): State<AppState>,
    Json(payload): Json<LiffEventsRequest>,
) -> AppResult<Json<ApiResponse<LiffEvents>>> {
    let resp = event_service::liff_events(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/liff/promotions",
    responses(
        (status = 200, description = "Promotions running today", body = ApiResponse<PromotionList>)
    ),
    tag = "LIFF"
)]
pub async fn liff_promotions(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<PromotionList>>> {
    let resp = promotion_service::list_promotions(&state).await?;
    Ok(Json(resp))
}
