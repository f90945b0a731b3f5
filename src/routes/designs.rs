use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        Deleted,
        showcase::{CreateDesignRequest, DesignList, DesignSaved, UpdateDesignRequest},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Counters, Design},
    response::ApiResponse,
    routes::params::{LikeAction, LikeQuery, ShowcaseQuery},
    services::{counter::Bump, design_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_designs))
        .route("/{id}", get(get_design))
        .route("/{id}/like", post(like_design))
        .route("/{id}/view", post(view_design))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_designs_admin).post(create_design))
        .route("/{id}", put(update_design).delete(delete_design))
}

#[utoipa::path(
    get,
    path = "/api/designs",
    params(ShowcaseQuery),
    responses(
        (status = 200, description = "List active designs", body = ApiResponse<DesignList>)
    ),
    tag = "Showcase"
)]
pub async fn list_designs(
    State(state): State<AppState>,
    Query(query): Query<ShowcaseQuery>,
) -> AppResult<Json<ApiResponse<DesignList>>> {
    let resp = design_service::list_designs(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/designs/{id}",
    params(("id" = Uuid, Path, description = "Design ID")),
    responses(
        (status = 200, description = "Get design", body = ApiResponse<Design>),
        (status = 404, description = "Not found")
    ),
    tag = "Showcase"
)]
pub async fn get_design(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Design>>> {
    let resp = design_service::get_design(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/designs/{id}/like",
    params(("id" = Uuid, Path, description = "Design ID"), LikeQuery),
    responses(
        (status = 200, description = "Counts after the change", body = ApiResponse<Counters>),
        (status = 404, description = "Not found")
    ),
    tag = "Showcase"
)]
pub async fn like_design(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LikeQuery>,
) -> AppResult<Json<ApiResponse<Counters>>> {
    let action = query.action.unwrap_or(LikeAction::Like);
    let resp = design_service::count(&state, id, action.into()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/designs/{id}/view",
    params(("id" = Uuid, Path, description = "Design ID")),
    responses(
        (status = 200, description = "Counts after the view", body = ApiResponse<Counters>),
        (status = 404, description = "Not found")
    ),
    tag = "Showcase"
)]
pub async fn view_design(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Counters>>> {
    let resp = design_service::count(&state, id, Bump::View).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/designs",
    params(ShowcaseQuery),
    responses(
        (status = 200, description = "List designs of any status", body = ApiResponse<DesignList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_designs_admin(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ShowcaseQuery>,
) -> AppResult<Json<ApiResponse<DesignList>>> {
    let resp = design_service::list_designs_admin(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/designs",
    request_body = CreateDesignRequest,
    responses(
        (status = 200, description = "Create design", body = ApiResponse<Design>),
        (status = 400, description = "Bad request")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_design(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateDesignRequest>,
) -> AppResult<Json<ApiResponse<Design>>> {
    let resp = design_service::create_design(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/designs/{id}",
    params(("id" = Uuid, Path, description = "Design ID")),
    request_body = UpdateDesignRequest,
    responses(
        (status = 200, description = "Update design", body = ApiResponse<DesignSaved>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_design(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDesignRequest>,
) -> AppResult<Json<ApiResponse<DesignSaved>>> {
    let resp = design_service::update_design(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/designs/{id}",
    params(("id" = Uuid, Path, description = "Design ID")),
    responses(
        (status = 200, description = "Delete design and its image", body = ApiResponse<Deleted>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_design(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    let resp = design_service::delete_design(&state, &user, id).await?;
    Ok(Json(resp))
}
