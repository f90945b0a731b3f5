use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    catalog::ImageDraft,
    dto::Deleted,
    dto::showcase::{CreatePortfolioRequest, PortfolioList, PortfolioSaved, UpdatePortfolioRequest},
    entity::portfolios::{ActiveModel, Column, Entity as Portfolios, Model as PortfolioModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::{
        Counters, Portfolio, STATUS_ACTIVE, encode_images, parse_images, require, validate_status,
    },
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
) -> AppResult<ApiResponse<PortfolioList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();
    if public {
        condition = condition.add(Column::Status.eq(STATUS_ACTIVE));
    }
    if let Some(category) = query.category.as_ref().filter(|c| !c.trim().is_empty()) {
        condition = condition.add(Column::Category.eq(category.trim()));
    }

    let finder = Portfolios::find()
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
        .map(Portfolio::from)
        .collect();

    Ok(ApiResponse::success(
        "Portfolios",
        PortfolioList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn list_portfolios(
    state: &AppState,
    query: ShowcaseQuery,
) -> AppResult<ApiResponse<PortfolioList>> {
    list_with(state, query, true).await
}

pub async fn list_portfolios_admin(
    state: &AppState,
    user: &AuthUser,
    query: ShowcaseQuery,
) -> AppResult<ApiResponse<PortfolioList>> {
    ensure_staff(user)?;
    list_with(state, query, false).await
}

async fn find_portfolio(state: &AppState, id: Uuid) -> AppResult<PortfolioModel> {
    match Portfolios::find_by_id(id).one(&state.orm).await? {
        Some(p) => Ok(p),
        None => Err(AppError::NotFound),
    }
}

pub async fn get_portfolio(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Portfolio>> {
    let portfolio = find_portfolio(state, id).await?;
    if portfolio.status != STATUS_ACTIVE {
        return Err(AppError::NotFound);
    }
    Ok(ApiResponse::success("Portfolio", portfolio.into(), None))
}

pub async fn create_portfolio(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePortfolioRequest,
) -> AppResult<ApiResponse<Portfolio>> {
    ensure_staff(user)?;
    let title = require("title", &payload.title)?;
    let status = payload.status.unwrap_or_else(|| STATUS_ACTIVE.to_string());
    validate_status(&status)?;
    let images = ImageDraft {
        images: payload.images,
        removed: Vec::new(),
    }
    .plan(&[])
    .images;

    let portfolio = ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        category: Set(payload.category.unwrap_or_default().trim().to_string()),
        description: Set(payload.description),
        images: Set(encode_images(&images)),
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
        "portfolio_create",
        "portfolios",
        serde_json::json!({ "portfolio_id": portfolio.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Portfolio created",
        portfolio.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_portfolio(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdatePortfolioRequest,
) -> AppResult<ApiResponse<PortfolioSaved>> {
    ensure_staff(user)?;
    let existing = find_portfolio(state, id).await?;
    let stored_images = parse_images(&existing.images);
    let changes = ImageDraft {
        images: payload.images.unwrap_or_else(|| stored_images.clone()),
        removed: payload.removed_images,
    }
    .plan(&stored_images);

    let mut active: ActiveModel = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(require("title", &title)?);
    }
    if let Some(category) = payload.category {
        active.category = Set(category.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(status) = payload.status {
        validate_status(&status)?;
        active.status = Set(status);
    }
    if let Some(order) = payload.order {
        active.sort_order = Set(order);
    }
    active.images = Set(encode_images(&changes.images));

    let portfolio = active.update(&state.orm).await?;
    let cleanup_failures = upload_service::remove_files(state, &changes.removed).await;

    audit::record(
        state,
        user,
        "portfolio_update",
        "portfolios",
        serde_json::json!({ "portfolio_id": portfolio.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        PortfolioSaved {
            portfolio: portfolio.into(),
            cleanup_failures,
        },
        Some(Meta::empty()),
    ))
}

pub async fn delete_portfolio(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Deleted>> {
    ensure_staff(user)?;
    let existing = find_portfolio(state, id).await?;
    Portfolios::delete_by_id(id).exec(&state.orm).await?;
    let cleanup_failures =
        upload_service::remove_files(state, &parse_images(&existing.images)).await;

    audit::record(
        state,
        user,
        "portfolio_delete",
        "portfolios",
        serde_json::json!({ "portfolio_id": id }),
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
    bump::<Portfolios>(
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

    let portfolio = find_portfolio(state, id).await?;
    Ok(ApiResponse::success(
        "Counted",
        Counters {
            likes: portfolio.likes,
            views: portfolio.views,
        },
        None,
    ))
}
