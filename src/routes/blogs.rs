use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::{
        Deleted,
        blogs::{BlogList, CreateBlogRequest, UpdateBlogRequest},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Blog,
    response::ApiResponse,
    routes::params::{Pagination, StatusQuery},
    services::blog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_blogs))
        .route("/{slug}", get(get_blog))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_blogs_admin).post(create_blog))
        .route(
            "/{id}",
            get(get_blog_admin).put(update_blog).delete(delete_blog),
        )
}

#[utoipa::path(
    get,
    path = "/api/blogs",
    params(Pagination),
    responses(
        (status = 200, description = "Published posts, newest first", body = ApiResponse<BlogList>)
    ),
    tag = "Blog"
)]
pub async fn list_blogs(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<BlogList>>> {
    let resp = blog_service::list_published(&state, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/blogs/{slug}",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Published post", body = ApiResponse<Blog>),
        (status = 404, description = "Not found")
    ),
    tag = "Blog"
)]
pub async fn get_blog(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<Blog>>> {
    let resp = blog_service::get_published(&state, &slug).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/blogs",
    params(StatusQuery),
    responses(
        (status = 200, description = "Posts of any status", body = ApiResponse<BlogList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_blogs_admin(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<StatusQuery>,
) -> AppResult<Json<ApiResponse<BlogList>>> {
    let resp = blog_service::list_blogs_admin(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/blogs/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Get post", body = ApiResponse<Blog>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_blog_admin(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Blog>>> {
    let resp = blog_service::get_blog_admin(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/blogs",
    request_body = CreateBlogRequest,
    responses(
        (status = 200, description = "Create post", body = ApiResponse<Blog>),
        (status = 409, description = "Slug already used")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_blog(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateBlogRequest>,
) -> AppResult<Json<ApiResponse<Blog>>> {
    let resp = blog_service::create_blog(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/blogs/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = UpdateBlogRequest,
    responses(
        (status = 200, description = "Update post", body = ApiResponse<Blog>),
        (status = 404, description = "Not found"),
        (status = 409, description = "Slug already used")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_blog(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBlogRequest>,
) -> AppResult<Json<ApiResponse<Blog>>> {
    let resp = blog_service::update_blog(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/blogs/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Delete post", body = ApiResponse<Deleted>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_blog(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    let resp = blog_service::delete_blog(&state, &user, id).await?;
    Ok(Json(resp))
}
