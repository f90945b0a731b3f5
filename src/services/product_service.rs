use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QuerySelect, Set};
use uuid::Uuid;

use crate::{
    audit,
    catalog::{ImageDraft, ProductFilter},
    dto::Deleted,
    dto::products::{
        CreateProductRequest, ProductImagesResult, ProductList, ProductSaved, UpdateProductRequest,
    },
    entity::{
        categories::Entity as Categories,
        products::{ActiveModel, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::{
        Product, STATUS_ACTIVE, encode_images, normalize_slug, parse_images, require, slug_from_name,
        validate_status,
    },
    response::{ApiResponse, Meta},
    routes::params::{AdminProductQuery, ProductQuery},
    services::upload_service::{self, StagedUpload},
    state::AppState,
    storage::{rollback, upload_all},
};

async fn list_with(
    state: &AppState,
    filter: ProductFilter,
    page: i64,
    limit: i64,
    offset: i64,
) -> AppResult<ApiResponse<ProductList>> {
    let finder = filter.select();
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let filter = ProductFilter::public(query.category_id, query.q);
    list_with(state, filter, page, limit, offset).await
}

pub async fn list_products_admin(
    state: &AppState,
    user: &AuthUser,
    query: AdminProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_staff(user)?;
    let (page, limit, offset) = query.pagination().normalize();
    let filter = ProductFilter::admin(query.category_id, query.q, query.status);
    list_with(state, filter, page, limit, offset).await
}

/// Public product detail. Hidden unless both the product and its category are active.
pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let found = Products::find_by_id(id)
        .find_also_related(Categories)
        .one(&state.orm)
        .await?;
    let product = match found {
        Some((product, Some(category)))
            if product.status == STATUS_ACTIVE && category.status == STATUS_ACTIVE =>
        {
            product
        }
        _ => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Product", product.into(), None))
}

pub async fn get_product_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Product>> {
    ensure_staff(user)?;
    let product = find_product(state, id).await?;
    Ok(ApiResponse::success("Product", product.into(), None))
}

async fn find_product(state: &AppState, id: Uuid) -> AppResult<ProductModel> {
    match Products::find_by_id(id).one(&state.orm).await? {
        Some(p) => Ok(p),
        None => Err(AppError::NotFound),
    }
}

async fn ensure_category_exists(state: &AppState, category_id: Uuid) -> AppResult<()> {
    if Categories::find_by_id(category_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::BadRequest("category does not exist".into()));
    }
    Ok(())
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_staff(user)?;
    let name = require("name", &payload.name)?;
    let slug = match payload.slug.as_deref() {
        Some(slug) => normalize_slug(slug)?,
        None => slug_from_name(&name)?,
    };
    let status = payload.status.unwrap_or_else(|| STATUS_ACTIVE.to_string());
    validate_status(&status)?;
    ensure_category_exists(state, payload.category_id).await?;

    let images = ImageDraft {
        images: payload.images,
        removed: Vec::new(),
    }
    .plan(&[])
    .images;

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        slug: Set(slug),
        category_id: Set(payload.category_id),
        price: Set(payload.price),
        price_unit: Set(payload.price_unit),
        images: Set(encode_images(&images)),
        description: Set(payload.description),
        status: Set(status),
        sort_order: Set(payload.order.unwrap_or(0)),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let product = active.insert(&state.orm).await?;

    audit::record(
        state,
        user,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        product.into(),
        Some(Meta::empty()),
    ))
}

/// Saves the product, then deletes image files dropped from its list.
pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<ProductSaved>> {
    ensure_staff(user)?;
    let existing = find_product(state, id).await?;
    let stored_images = parse_images(&existing.images);

    let changes = ImageDraft {
        images: payload.images.unwrap_or_else(|| stored_images.clone()),
        removed: payload.removed_images,
    }
    .plan(&stored_images);

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(require("name", &name)?);
    }
    if let Some(slug) = payload.slug {
        active.slug = Set(normalize_slug(&slug)?);
    }
    if let Some(category_id) = payload.category_id {
        ensure_category_exists(state, category_id).await?;
        active.category_id = Set(category_id);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(price_unit) = payload.price_unit {
        active.price_unit = Set(Some(price_unit));
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
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;
    let cleanup_failures = upload_service::remove_files(state, &changes.removed).await;

    audit::record(
        state,
        user,
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id, "removed_images": changes.removed }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        ProductSaved {
            product: product.into(),
            cleanup_failures,
        },
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Deleted>> {
    ensure_staff(user)?;
    let existing = find_product(state, id).await?;
    Products::delete_by_id(id).exec(&state.orm).await?;

    let cleanup_failures =
        upload_service::remove_files(state, &parse_images(&existing.images)).await;

    audit::record(
        state,
        user,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
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

/// Uploads a batch of images and appends them to the product only if every
/// file made it. On any failure the uploaded files are deleted again and the
/// product is left as it was.
pub async fn attach_images(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    upload: StagedUpload,
) -> AppResult<ApiResponse<ProductImagesResult>> {
    ensure_staff(user)?;
    let existing = find_product(state, id).await?;
    if upload.files.is_empty() {
        return Err(AppError::BadRequest("no files in upload".into()));
    }

    let store = state.store.as_ref();
    let mut report = upload_all(store, &upload.folder, upload.files).await;

    if !report.all_succeeded() {
        rollback(store, &mut report).await;
        tracing::warn!(
            product_id = %id,
            failed = report.failed(),
            leftovers = report.leftovers.len(),
            "image batch not committed"
        );
        return Ok(ApiResponse::success(
            "Upload failed, product unchanged",
            ProductImagesResult {
                product: None,
                report,
            },
            Some(Meta::empty()),
        ));
    }

    let mut images = parse_images(&existing.images);
    images.extend(report.urls());
    let mut active: ActiveModel = existing.into();
    active.images = Set(encode_images(&images));
    active.updated_at = Set(Utc::now().into());

    let product = match active.update(&state.orm).await {
        Ok(product) => product,
        Err(err) => {
            rollback(store, &mut report).await;
            if report.leftovers.is_empty() {
                return Err(err.into());
            }
            return Err(AppError::Storage(format!(
                "saving product failed ({err}), files left in storage: {}",
                report.leftovers.join(", ")
            )));
        }
    };
    report.committed = true;

    audit::record(
        state,
        user,
        "product_images_attach",
        "products",
        serde_json::json!({ "product_id": id, "count": report.outcomes.len(), "watermark": upload.watermark }),
    )
    .await;

    Ok(ApiResponse::success(
        "Images attached",
        ProductImagesResult {
            product: Some(product.into()),
            report,
        },
        Some(Meta::empty()),
    ))
}

