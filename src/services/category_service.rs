use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, DbBackend, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, Statement, TransactionTrait,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    audit,
    catalog::{CategoryIndex, aggregate_tree, tree::check_reparent},
    dto::categories::{
        CategoryDeleted, CategoryList, CategoryTree, CategoryTreeNode, CreateCategoryRequest,
        UpdateCategoryRequest,
    },
    entity::{
        categories::{ActiveModel, Column, Entity as Categories},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::{
        Category, CategoryWithCounts, STATUS_ACTIVE, normalize_slug, parse_images, require,
        validate_status,
    },
    response::{ApiResponse, Meta},
    services::upload_service,
    state::AppState,
};

/// Advisory lock key held by every category write.
const CATEGORY_WRITE_LOCK: i64 = 0x6361_7465_676f_7279;

/// Opens a transaction holding the category write lock until commit, so
/// parent and sibling checks see every earlier write.
async fn begin_category_write(state: &AppState) -> AppResult<DatabaseTransaction> {
    let txn = state.orm.begin().await?;
    txn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT pg_advisory_xact_lock($1)",
        [sea_orm::Value::from(CATEGORY_WRITE_LOCK)],
    ))
    .await?;
    Ok(txn)
}

/// Public two-level tree of active categories.
pub async fn public_tree(state: &AppState) -> AppResult<ApiResponse<CategoryTree>> {
    let active = Categories::find()
        .filter(Column::Status.eq(STATUS_ACTIVE))
        .order_by_asc(Column::SortOrder)
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?;

    let items = aggregate_tree(&active)
        .into_iter()
        .map(|group| CategoryTreeNode {
            category: group.category.into(),
            children: group.children.into_iter().map(Category::from).collect(),
        })
        .collect();

    Ok(ApiResponse::success(
        "Categories",
        CategoryTree { items },
        Some(Meta::empty()),
    ))
}

pub async fn list_categories(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<CategoryList>> {
    ensure_staff(user)?;
    let categories = Categories::find()
        .order_by_asc(Column::SortOrder)
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?;
    let index = CategoryIndex::new(categories.clone());

    let product_counts: HashMap<Uuid, i64> = Products::find()
        .select_only()
        .column(ProdCol::CategoryId)
        .column_as(Expr::col(ProdCol::Id).count(), "product_count")
        .group_by(ProdCol::CategoryId)
        .into_tuple::<(Uuid, i64)>()
        .all(&state.orm)
        .await?
        .into_iter()
        .collect();

    let items: Vec<CategoryWithCounts> = categories
        .into_iter()
        .map(|model| CategoryWithCounts {
            child_count: index.child_count(model.id) as i64,
            product_count: product_counts.get(&model.id).copied().unwrap_or(0),
            category: model.into(),
        })
        .collect();

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_staff(user)?;
    let name = require("name", &payload.name)?;
    let slug = normalize_slug(&payload.slug)?;
    let status = payload.status.unwrap_or_else(|| STATUS_ACTIVE.to_string());
    validate_status(&status)?;

    let txn = begin_category_write(state).await?;
    let index = CategoryIndex::load(&txn).await?;
    if let Some(parent_id) = payload.parent_id {
        if index.get(parent_id).is_none() {
            return Err(AppError::BadRequest("parent category does not exist".into()));
        }
    }
    if index.sibling_with_slug(payload.parent_id, &slug, None).is_some() {
        return Err(AppError::Conflict(format!(
            "slug '{slug}' is already used at this level"
        )));
    }

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        slug: Set(slug),
        description: Set(payload.description),
        image: Set(payload.image),
        parent_id: Set(payload.parent_id),
        status: Set(status),
        sort_order: Set(payload.order.unwrap_or(0)),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let category = active.insert(&txn).await?;
    txn.commit().await?;

    tracing::info!(category_id = %category.id, slug = %category.slug, "category created");
    audit::record(
        state,
        user,
        "category_create",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category created",
        category.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_staff(user)?;
    let txn = begin_category_write(state).await?;
    let index = CategoryIndex::load(&txn).await?;
    let existing = match index.get(id) {
        Some(c) => c.clone(),
        None => return Err(AppError::NotFound),
    };

    let parent_id = match payload.parent_id {
        Some(parent) => {
            check_reparent(&index, id, parent)?;
            parent
        }
        None => existing.parent_id,
    };
    let slug = match payload.slug.as_deref() {
        Some(slug) => normalize_slug(slug)?,
        None => existing.slug.clone(),
    };
    if index.sibling_with_slug(parent_id, &slug, Some(id)).is_some() {
        return Err(AppError::Conflict(format!(
            "slug '{slug}' is already used at this level"
        )));
    }

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(require("name", &name)?);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(image) = payload.image {
        active.image = Set(Some(image));
    }
    if let Some(status) = payload.status {
        validate_status(&status)?;
        active.status = Set(status);
    }
    if let Some(order) = payload.order {
        active.sort_order = Set(order);
    }
    active.slug = Set(slug);
    active.parent_id = Set(parent_id);
    active.updated_at = Set(Utc::now().into());

    let category = active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        state,
        user,
        "category_update",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        category.into(),
        Some(Meta::empty()),
    ))
}

/// Deletes a leaf category together with its products.
pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<CategoryDeleted>> {
    ensure_staff(user)?;

    let txn = begin_category_write(state).await?;
    if Categories::find_by_id(id).one(&txn).await?.is_none() {
        return Err(AppError::NotFound);
    }
    let children = Categories::find()
        .filter(Column::ParentId.eq(id))
        .count(&txn)
        .await?;
    if children > 0 {
        return Err(AppError::BadRequest(format!(
            "category still has {children} subcategories"
        )));
    }

    let images: Vec<String> = Products::find()
        .select_only()
        .column(ProdCol::Images)
        .filter(ProdCol::CategoryId.eq(id))
        .into_tuple::<String>()
        .all(&txn)
        .await?
        .iter()
        .flat_map(|raw| parse_images(raw))
        .collect();
    let deleted_products = Products::delete_many()
        .filter(ProdCol::CategoryId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;
    Categories::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    let cleanup_failures = upload_service::remove_files(state, &images).await;

    tracing::info!(category_id = %id, deleted_products, "category deleted");
    audit::record(
        state,
        user,
        "category_delete",
        "categories",
        serde_json::json!({ "category_id": id, "deleted_products": deleted_products }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        CategoryDeleted {
            id,
            deleted_products,
            cleanup_failures,
        },
        Some(Meta::empty()),
    ))
}
