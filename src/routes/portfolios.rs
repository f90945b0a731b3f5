use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        Deleted,
        showcase::{CreatePortfolioRequest, PortfolioList, PortfolioSaved, UpdatePortfolioRequest},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Counters, Portfolio},
    response::ApiResponse,
    routes::params::{LikeAction, LikeQuery, ShowcaseQuery},
    services::{counter::Bump, portfolio_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_portfolios))
        .route("/{id}", get(get_portfolio))
        .route("/{id}/like", post(like_portfolio))
        .route("/{id}/view", post(view_portfolio))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_portfolios_admin).post(create_portfolio))
        .route("/{id}", put(update_portfolio).delete(delete_portfolio))
}

#[utoipa::path(
    get,
    path = "/api/portfolios",
    params(ShowcaseQuery),
    responses(
        (status = 200, description = "List active portfolio items", body = ApiResponse<PortfolioList>)
    ),
    tag = "Showcase"
)]
pub async fn list_portfolios(
    State(state): State<AppState>,
    Query(query): Query<ShowcaseQuery>,
) -> AppResult<Json<ApiResponse<PortfolioList>>> {
    let resp = portfolio_service::list_portfolios(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/portfolios/{id}",
    params(("id" = Uuid, Path, description = "Portfolio ID")),
    responses(
        (status = 200, description = "Get portfolio item", body = ApiResponse<Portfolio>),
        (status = 404, description = "Not found")
    ),
    tag = "Showcase"
)]
pub async fn get_portfolio(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Portfolio>>> {
    let resp = portfolio_service::get_portfolio(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/portfolios/{id}/like",
    params(("id" = Uuid, Path, description = "Portfolio ID"), LikeQuery),
    responses(
        (status = 200, description = "Counts after the change", body = ApiResponse<Counters>),
        (status = 404, description = "Not found")
    ),
    tag = "Showcase"
)]
pub async fn like_portfolio(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LikeQuery>,
) -> AppResult<Json<ApiResponse<Counters>>> {
    let action = query.action.unwrap_or(LikeAction::Like);
    let resp = portfolio_service::count(&state, id, action.into()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/portfolios/{id}/view",
    params(("id" = Uuid, Path, description = "Portfolio ID")),
    responses(
        (status = 200, description = "Counts after the view", body = ApiResponse<Counters>),
        (status = 404, description = "Not found")
    ),
    tag = "Showcase"
)]
pub async fn view_portfolio(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Counters>>> {
    let resp = portfolio_service::count(&state, id, Bump::View).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/portfolios",
    params(ShowcaseQuery),
    responses(
        (status = 200, description = "List portfolio items of any status", body = ApiResponse<PortfolioList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_portfolios_admin(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ShowcaseQuery>,
) -> AppResult<Json<ApiResponse<PortfolioList>>> {
    let resp = portfolio_service::list_portfolios_admin(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/portfolios",
    request_body = CreatePortfolioRequest,
    responses(
        (status = 200, description = "Create portfolio item", body = ApiResponse<Portfolio>),
        (status = 400, description = "Bad request")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_portfolio(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePortfolioRequest>,
) -> AppResult<Json<ApiResponse<Portfolio>>> {
    let resp = portfolio_service::create_portfolio(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/portfolios/{id}",
    params(("id" = Uuid, Path, description = "Portfolio ID")),
    request_body = UpdatePortfolioRequest,
    responses(
        (status = 200, description = "Portfolio saved; dropped images removed from storage", body = ApiResponse<PortfolioSaved>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_portfolio(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePortfolioRequest>,
) -> AppResult<Json<ApiResponse<PortfolioSaved>>> {
    let resp = portfolio_service::update_portfolio(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/portfolios/{id}",
    params(("id" = Uuid, Path, description = "Portfolio ID")),
    responses(
        (status = 200, description = "Delete portfolio item and its images", body = ApiResponse<Deleted>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_portfolio(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    let resp = portfolio_service::delete_portfolio(&state, &user, id).await?;
    Ok(Json(resp))
}
