use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::Deleted,
    dto::blogs::{BlogList, CreateBlogRequest, UpdateBlogRequest},
    entity::blogs::{ActiveModel, Column, Entity as Blogs, Model as BlogModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::{
        BLOG_DRAFT, BLOG_PUBLISHED, Blog, normalize_slug, require, slug_from_name, validate_blog_status,
    },
    response::{ApiResponse, Meta},
    routes::params::{Pagination, StatusQuery},
    state::AppState,
};

pub async fn list_published(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<BlogList>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Blogs::find()
        .filter(Column::Status.eq(BLOG_PUBLISHED))
        .order_by_desc(Column::PublishedAt)
        .order_by_desc(Column::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Blog::from)
        .collect();

    Ok(ApiResponse::success(
        "Blogs",
        BlogList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_published(state: &AppState, slug: &str) -> AppResult<ApiResponse<Blog>> {
    let blog = Blogs::find()
        .filter(Column::Slug.eq(slug.trim().to_lowercase()))
        .filter(Column::Status.eq(BLOG_PUBLISHED))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Blog", blog.into(), None))
}

pub async fn list_blogs_admin(
    state: &AppState,
    user: &AuthUser,
    query: StatusQuery,
) -> AppResult<ApiResponse<BlogList>> {
    ensure_staff(user)?;
    let (page, limit, offset) = query.pagination().normalize();
    let mut finder = Blogs::find();
    if let Some(status) = query.status.as_deref().filter(|s| !s.is_empty()) {
        finder = finder.filter(Column::Status.eq(status));
    }
    let finder = finder.order_by_desc(Column::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Blog::from)
        .collect();

    Ok(ApiResponse::success(
        "Blogs",
        BlogList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

async fn find_blog(state: &AppState, id: Uuid) -> AppResult<BlogModel> {
    Blogs::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

async fn ensure_slug_free(state: &AppState, slug: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut finder = Blogs::find().filter(Column::Slug.eq(slug));
    if let Some(id) = except {
        finder = finder.filter(Column::Id.ne(id));
    }
    if finder.one(&state.orm).await?.is_some() {
        return Err(AppError::Conflict(format!("slug '{slug}' is already used")));
    }
    Ok(())
}

pub async fn get_blog_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Blog>> {
    ensure_staff(user)?;
    let blog = find_blog(state, id).await?;
    Ok(ApiResponse::success("Blog", blog.into(), None))
}

pub async fn create_blog(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBlogRequest,
) -> AppResult<ApiResponse<Blog>> {
    ensure_staff(user)?;
    let title = require("title", &payload.title)?;
    let content = require("content", &payload.content)?;
    let slug = match payload.slug.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(slug) => normalize_slug(slug)?,
        None => slug_from_name(&title)?,
    };
    let status = payload.status.unwrap_or_else(|| BLOG_DRAFT.to_string());
    validate_blog_status(&status)?;
    ensure_slug_free(state, &slug, None).await?;

    let published_at: Option<DateTimeWithTimeZone> =
        (status == BLOG_PUBLISHED).then(|| Utc::now().into());
    let blog = ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        slug: Set(slug),
        excerpt: Set(payload.excerpt),
        content: Set(content),
        cover_image: Set(payload.cover_image),
        author: Set(payload.author),
        status: Set(status),
        published_at: Set(published_at),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        state,
        user,
        "blog_create",
        "blogs",
        serde_json::json!({ "blog_id": blog.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Blog created",
        blog.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_blog(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateBlogRequest,
) -> AppResult<ApiResponse<Blog>> {
    ensure_staff(user)?;
    let existing = find_blog(state, id).await?;
    let first_publish = existing.published_at.is_none();

    let mut active: ActiveModel = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(require("title", &title)?);
    }
    if let Some(slug) = payload.slug {
        let slug = normalize_slug(&slug)?;
        ensure_slug_free(state, &slug, Some(id)).await?;
        active.slug = Set(slug);
    }
    if let Some(excerpt) = payload.excerpt {
        active.excerpt = Set(Some(excerpt));
    }
    if let Some(content) = payload.content {
        active.content = Set(require("content", &content)?);
    }
    if let Some(cover_image) = payload.cover_image {
        active.cover_image = Set(Some(cover_image));
    }
    if let Some(author) = payload.author {
        active.author = Set(Some(author));
    }
    if let Some(status) = payload.status {
        validate_blog_status(&status)?;
        if status == BLOG_PUBLISHED && first_publish {
            active.published_at = Set(Some(Utc::now().into()));
        }
        active.status = Set(status);
    }
    active.updated_at = Set(Utc::now().into());

    let blog = active.update(&state.orm).await?;

    audit::record(
        state,
        user,
        "blog_update",
        "blogs",
        serde_json::json!({ "blog_id": blog.id, "status": blog.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        blog.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_blog(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Deleted>> {
    ensure_staff(user)?;
    let result = Blogs::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        state,
        user,
        "blog_delete",
        "blogs",
        serde_json::json!({ "blog_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        Deleted::new(id),
        Some(Meta::empty()),
    ))
}
