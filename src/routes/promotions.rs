use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        Deleted,
        promotions::{CreatePromotionRequest, PromotionList, UpdatePromotionRequest},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Promotion,
    response::ApiResponse,
    services::promotion_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_promotions))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_promotions_admin).post(create_promotion))
        .route("/{id}", put(update_promotion).delete(delete_promotion))
}

#[utoipa::path(
    get,
    path = "/api/promotions",
    responses(
        (status = 200, description = "Active promotions running today", body = ApiResponse<PromotionList>)
    ),
    tag = "Promotions"
)]
pub async fn list_promotions(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<PromotionList>>> {
    let resp = promotion_service::list_promotions(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/promotions",
    responses(
        (status = 200, description = "All promotions", body = ApiResponse<PromotionList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_promotions_admin(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<PromotionList>>> {
    let resp = promotion_service::list_promotions_admin(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/promotions",
    request_body = CreatePromotionRequest,
    responses(
        (status = 200, description = "Create promotion", body = ApiResponse<Promotion>),
        (status = 400, description = "Start date after end date")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_promotion(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePromotionRequest>,
) -> AppResult<Json<ApiResponse<Promotion>>> {
    let resp = promotion_service::create_promotion(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/promotions/{id}",
    params(("id" = Uuid, Path, description = "Promotion ID")),
    request_body = UpdatePromotionRequest,
    responses(
        (status = 200, description = "Update promotion", body = ApiResponse<Promotion>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_promotion(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePromotionRequest>,
) -> AppResult<Json<ApiResponse<Promotion>>> {
    let resp = promotion_service::update_promotion(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/promotions/{id}",
    params(("id" = Uuid, Path, description = "Promotion ID")),
    responses(
        (status = 200, description = "Delete promotion", body = ApiResponse<Deleted>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_promotion(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    let resp = promotion_service::delete_promotion(&state, &user, id).await?;
    Ok(Json(resp))
}
