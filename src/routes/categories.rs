use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::categories::{
        CategoryDeleted, CategoryList, CategoryPage, CategoryTree, CreateCategoryRequest,
        UpdateCategoryRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Category,
    response::ApiResponse,
    routes::params::SlugPathQuery,
    services::{catalog_service, category_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(category_tree))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/by-path", get(category_page_admin))
        .route("/{id}", put(update_category).delete(delete_category))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "Active categories grouped under their roots", body = ApiResponse<CategoryTree>)
    ),
    tag = "Categories"
)]
pub async fn category_tree(State(state): State<AppState>) -> AppResult<Json<ApiResponse<CategoryTree>>> {
    let resp = category_service::public_tree(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/categories",
    responses(
        (status = 200, description = "All categories with child and product counts", body = ApiResponse<CategoryList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = category_service::list_categories(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/categories/by-path",
    params(SlugPathQuery),
    responses(
        (status = 200, description = "Category page including inactive categories and products", body = ApiResponse<CategoryPage>),
        (status = 404, description = "No category at this path")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn category_page_admin(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SlugPathQuery>,
) -> AppResult<Json<ApiResponse<CategoryPage>>> {
    let resp = catalog_service::category_page_admin(&state, &user, &query.path).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 200, description = "Create category", body = ApiResponse<Category>),
        (status = 400, description = "Invalid slug or missing parent"),
        (status = 409, description = "Slug already used by a sibling")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = category_service::create_category(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Update category", body = ApiResponse<Category>),
        (status = 400, description = "Invalid parent, e.g. a descendant"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Slug already used by a sibling")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = category_service::update_category(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category and its products deleted", body = ApiResponse<CategoryDeleted>),
        (status = 400, description = "Category still has subcategories"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CategoryDeleted>>> {
    let resp = category_service::delete_category(&state, &user, id).await?;
    Ok(Json(resp))
}
