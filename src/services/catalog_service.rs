use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder};

use crate::{
    catalog::{ProductFilter, Visibility, build_breadcrumb, resolve_leaf, split_path},
    dto::categories::CategoryPage,
    entity::categories::{Column, Entity as Categories},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_staff},
    models::{Category, Product, STATUS_ACTIVE},
    response::{ApiResponse, Meta},
    state::AppState,
};

async fn page_for(state: &AppState, path: &str, visibility: Visibility) -> AppResult<CategoryPage> {
    let segments = split_path(path);
    let category = resolve_leaf(&state.orm, &segments, visibility).await?;
    let breadcrumb = build_breadcrumb(&state.orm, &category).await?;

    let mut child_cond = Condition::all().add(Column::ParentId.eq(category.id));
    if visibility == Visibility::Public {
        child_cond = child_cond.add(Column::Status.eq(STATUS_ACTIVE));
    }
    let children = Categories::find()
        .filter(child_cond)
        .order_by_asc(Column::SortOrder)
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Category::from)
        .collect();

    let filter = match visibility {
        Visibility::Public => ProductFilter::public(Some(category.id), None),
        Visibility::All => ProductFilter::admin(Some(category.id), None, None),
    };
    let products = filter
        .select()
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    tracing::debug!(path, category_id = %category.id, ?visibility, "category page resolved");

    Ok(CategoryPage {
        category: category.into(),
        children,
        products,
        breadcrumb,
    })
}

/// Resolves a storefront slug path such as `led/indoor` into the category,
/// its active children, its active products and the breadcrumb.
pub async fn category_page(state: &AppState, path: &str) -> AppResult<ApiResponse<CategoryPage>> {
    let page = page_for(state, path, Visibility::Public).await?;
    Ok(ApiResponse::success("Category", page, Some(Meta::empty())))
}

/// Dashboard preview of a slug path. Inactive categories and products are included.
pub async fn category_page_admin(
    state: &AppState,
    user: &AuthUser,
    path: &str,
) -> AppResult<ApiResponse<CategoryPage>> {
    ensure_staff(user)?;
    let page = page_for(state, path, Visibility::All).await?;
    Ok(ApiResponse::success("Category", page, Some(Meta::empty())))
}
