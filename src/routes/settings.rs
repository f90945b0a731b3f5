use axum::{
    Json, Router,
    extract::State,
    routing::{get, put},
};

use crate::{
    error::AppResult,
    middleware::auth::AuthUser,
    models::SiteSettings,
    response::ApiResponse,
    services::settings_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_settings))
}

pub fn admin_router() -> Router<AppState> {
    Router::new().route("/", put(update_settings))
}

#[utoipa::path(
    get,
    path = "/api/settings",
    responses(
        (status = 200, description = "Site settings as a key/value map", body = ApiResponse<SiteSettings>)
    ),
    tag = "Settings"
)]
pub async fn get_settings(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<SiteSettings>>> {
    let resp = settings_service::get_settings(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/settings",
    request_body = SiteSettings,
    responses(
        (status = 200, description = "Upsert the given keys", body = ApiResponse<SiteSettings>),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_settings(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SiteSettings>,
) -> AppResult<Json<ApiResponse<SiteSettings>>> {
    let resp = settings_service::update_settings(&state, &user, payload).await?;
    Ok(Json(resp))
}
