mod common;

use rental_showcase_api::{
    dto::{
        categories::{CreateCategoryRequest, UpdateCategoryRequest},
        products::{CreateProductRequest, UpdateProductRequest},
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::{BreadcrumbItem, Category},
    routes::params::{AdminProductQuery, ProductQuery},
    services::{catalog_service, category_service, product_service},
    state::AppState,
};
use uuid::Uuid;

async fn category(
    state: &AppState,
    staff: &AuthUser,
    parent_id: Option<Uuid>,
    name: &str,
    slug: &str,
    order: i32,
) -> anyhow::Result<Category> {
    let resp = category_service::create_category(
        state,
        staff,
        CreateCategoryRequest {
            name: name.into(),
            slug: slug.into(),
            description: None,
            image: None,
            parent_id,
            status: None,
            order: Some(order),
        },
    )
    .await?;
    Ok(resp.data.expect("category"))
}

async fn product(
    state: &AppState,
    staff: &AuthUser,
    category_id: Uuid,
    name: &str,
    status: &str,
) -> anyhow::Result<Uuid> {
    let resp = product_service::create_product(
        state,
        staff,
        CreateProductRequest {
            name: name.into(),
            slug: None,
            category_id,
            price: None,
            price_unit: Some("per day".into()),
            images: vec![],
            description: None,
            status: Some(status.into()),
            order: None,
        },
    )
    .await?;
    Ok(resp.data.expect("product").id)
}

// Storefront flow: build LED > Indoor and Sound, resolve pages, then exercise admin edits.
#[tokio::test]
async fn category_pages_resolve_only_real_active_paths() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let state = common::setup_state(&database_url).await?;
    let staff = common::create_staff(&state, "sales", "sales@example.com").await?;

    let led = category(&state, &staff, None, "LED Screen", "led", 1).await?;
    let indoor = category(&state, &staff, Some(led.id), "Indoor", "indoor", 1).await?;
    let sound = category(&state, &staff, None, "Sound", "sound", 2).await?;
    let panel = product(&state, &staff, indoor.id, "P3.9 Panel", "active").await?;
    product(&state, &staff, indoor.id, "Retired Panel", "inactive").await?;

    // led/indoor resolves with a two-item breadcrumb and only active products.
    let page = catalog_service::category_page(&state, "LED/Indoor")
        .await?
        .data
        .expect("page");
    assert_eq!(page.category.id, indoor.id);
    assert_eq!(
        page.breadcrumb,
        vec![
            BreadcrumbItem {
                name: "LED Screen".into(),
                slug: "led".into()
            },
            BreadcrumbItem {
                name: "Indoor".into(),
                slug: "indoor".into()
            },
        ]
    );
    assert_eq!(page.products.len(), 1);
    assert_eq!(page.products[0].id, panel);
    assert_eq!(page.products[0].slug, "p3-9-panel");

    let root = catalog_service::category_page(&state, "led").await?.data.expect("page");
    assert_eq!(root.children.len(), 1);
    assert_eq!(root.breadcrumb.len(), 1);

    // Unknown segment and a real slug under the wrong parent both miss.
    for path in ["led/outdoor", "sound/indoor", "", "/"] {
        let err = catalog_service::category_page(&state, path).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound), "{path} should be not found");
    }

    // Duplicate sibling slug is a conflict; the same slug under another parent is fine.
    let dup = category_service::create_category(
        &state,
        &staff,
        CreateCategoryRequest {
            name: "Indoor again".into(),
            slug: "INDOOR".into(),
            description: None,
            image: None,
            parent_id: Some(led.id),
            status: None,
            order: None,
        },
    )
    .await;
    assert!(matches!(dup, Err(AppError::Conflict(_))));
    category(&state, &staff, Some(sound.id), "Indoor sound", "indoor", 1).await?;

    // A category cannot move under its own descendant.
    let cycle = category_service::update_category(
        &state,
        &staff,
        led.id,
        UpdateCategoryRequest {
            parent_id: Some(Some(indoor.id)),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(cycle, Err(AppError::BadRequest(_))));

    // Hiding the parent hides the whole branch from the storefront.
    category_service::update_category(
        &state,
        &staff,
        led.id,
        UpdateCategoryRequest {
            status: Some("inactive".into()),
            ..Default::default()
        },
    )
    .await?;
    let hidden = catalog_service::category_page(&state, "led/indoor").await;
    assert!(matches!(hidden, Err(AppError::NotFound)));
    let tree = category_service::public_tree(&state).await?.data.expect("tree");
    assert!(tree.items.iter().all(|group| group.category.id != led.id));

    // The dashboard still reaches the hidden branch, inactive products included.
    let preview = catalog_service::category_page_admin(&state, &staff, "led/indoor")
        .await?
        .data
        .expect("page");
    assert_eq!(preview.category.id, indoor.id);
    assert_eq!(preview.breadcrumb.len(), 2);
    assert_eq!(preview.products.len(), 2);

    // Public product listing skips inactive products; admin sees both.
    let public = product_service::list_products(
        &state,
        ProductQuery {
            category_id: Some(indoor.id),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(public.data.expect("list").items.len(), 1);
    let admin = product_service::list_products_admin(
        &state,
        &staff,
        AdminProductQuery {
            category_id: Some(indoor.id),
            q: Some("panel".into()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(admin.data.expect("list").items.len(), 2);

    // Clearing the price with an explicit null.
    let saved = product_service::update_product(
        &state,
        &staff,
        panel,
        UpdateProductRequest {
            price: Some(None),
            images: Some(vec!["https://cdn.example.com/external.jpg".into()]),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("saved");
    assert_eq!(saved.product.price, None);
    assert_eq!(saved.product.images, vec!["https://cdn.example.com/external.jpg".to_string()]);
    assert!(saved.cleanup_failures.is_empty());

    // Parents with children cannot be deleted; leaves take their products with them.
    let refused = category_service::delete_category(&state, &staff, led.id).await;
    assert!(matches!(refused, Err(AppError::BadRequest(_))));
    let deleted = category_service::delete_category(&state, &staff, indoor.id)
        .await?
        .data
        .expect("deleted");
    assert_eq!(deleted.deleted_products, 2);
    assert!(deleted.cleanup_failures.is_empty());

    let counts = category_service::list_categories(&state, &staff)
        .await?
        .data
        .expect("list");
    let led_row = counts
        .items
        .iter()
        .find(|c| c.category.id == led.id)
        .expect("led row");
    assert_eq!(led_row.child_count, 0);
    assert_eq!(led_row.product_count, 0);

    Ok(())
}
