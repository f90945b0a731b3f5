use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::Deleted,
    dto::showcase::{CreateDesignRequest, DesignList, DesignSaved, UpdateDesignRequest},
    entity::designs::{ActiveModel, Column, Entity as Designs, Model as DesignModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::{Counters, Design, STATUS_ACTIVE, require, validate_status},
    response::{ApiResponse, Meta},
    routes::params::ShowcaseQuery,
    services::{
        counter::{Bump, CounterColumns, bump},
        upload_service,
    },
    state::AppState,
};

async fn list_with(
    state: &AppState,
    query: ShowcaseQuery,
    public: bool,
) -> AppResult<ApiResponse<DesignList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();
    if public {
        condition = condition.add(Column::Status.eq(STATUS_ACTIVE));
    }
    if let Some(category) = query.category.as_ref().filter(|c| !c.trim().is_empty()) {
        condition = condition.add(Column::Category.eq(category.trim()));
    }

    let finder = Designs::find()
        .filter(condition)
        .order_by_asc(Column::SortOrder)
        .order_by_desc(Column::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Design::from)
        .collect();

    Ok(ApiResponse::success(
        "Designs",
        DesignList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn list_designs(
    state: &AppState,
    query: ShowcaseQuery,
) -> AppResult<ApiResponse<DesignList>> {
    list_with(state, query, true).await
}

pub async fn list_designs_admin(
    state: &AppState,
    user: &AuthUser,
    query: ShowcaseQuery,
) -> AppResult<ApiResponse<DesignList>> {
    ensure_staff(user)?;
    list_with(state, query, false).await
}

async fn find_design(state: &AppState, id: Uuid) -> AppResult<DesignModel> {
    Designs::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn get_design(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Design>> {
    let design = find_design(state, id).await?;
    if design.status != STATUS_ACTIVE {
        return Err(AppError::NotFound);
    }
    Ok(ApiResponse::success("Design", design.into(), None))
}

pub async fn create_design(
    state: &AppState,
    user: &AuthUser,
    payload: CreateDesignRequest,
) -> AppResult<ApiResponse<Design>> {
    ensure_staff(user)?;
    let title = require("title", &payload.title)?;
    let status = payload.status.unwrap_or_else(|| STATUS_ACTIVE.to_string());
    validate_status(&status)?;

    let design = ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        category: Set(payload.category.unwrap_or_default().trim().to_string()),
        image: Set(payload.image.filter(|url| !url.trim().is_empty())),
        status: Set(status),
        sort_order: Set(payload.order.unwrap_or(0)),
        likes: Set(0),
        views: Set(0),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        state,
        user,
        "design_create",
        "designs",
        serde_json::json!({ "design_id": design.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Design created",
        design.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_design(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateDesignRequest,
) -> AppResult<ApiResponse<DesignSaved>> {
    ensure_staff(user)?;
    let existing = find_design(state, id).await?;
    let previous_image = existing.image.clone();

    let mut active: ActiveModel = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(require("title", &title)?);
    }
    if let Some(category) = payload.category {
        active.category = Set(category.trim().to_string());
    }
    let mut replaced = None;
    if let Some(image) = payload.image {
        let image = image.filter(|url| !url.trim().is_empty());
        if image != previous_image {
            replaced = previous_image;
        }
        active.image = Set(image);
    }
    if let Some(status) = payload.status {
        validate_status(&status)?;
        active.status = Set(status);
    }
    if let Some(order) = payload.order {
        active.sort_order = Set(order);
    }

    let design = active.update(&state.orm).await?;
    let cleanup_failures = match replaced {
        Some(old) => upload_service::remove_files(state, &[old]).await,
        None => Vec::new(),
    };

    audit::record(
        state,
        user,
        "design_update",
        "designs",
        serde_json::json!({ "design_id": design.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        DesignSaved {
            design: design.into(),
            cleanup_failures,
        },
        Some(Meta::empty()),
    ))
}

pub async fn delete_design(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Deleted>> {
    ensure_staff(user)?;
    let existing = find_design(state, id).await?;
    Designs::delete_by_id(id).exec(&state.orm).await?;
    let cleanup_failures = match existing.image {
        Some(url) => upload_service::remove_files(state, &[url]).await,
        None => Vec::new(),
    };

    audit::record(
        state,
        user,
        "design_delete",
        "designs",
        serde_json::json!({ "design_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        Deleted {
            id,
            cleanup_failures,
        },
        Some(Meta::empty()),
    ))
}

pub async fn count(state: &AppState, id: Uuid, change: Bump) -> AppResult<ApiResponse<Counters>> {
    bump::<Designs>(
        &state.orm,
        CounterColumns {
            id: Column::Id,
            likes: Column::Likes,
            views: Column::Views,
        },
        id,
        change,
    )
    .await?;

    let design = find_design(state, id).await?;
    Ok(ApiResponse::success(
        "Counted",
        Counters {
            likes: design.likes,
            views: design.views,
        },
        None,
    ))
}
