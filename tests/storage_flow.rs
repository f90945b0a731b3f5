mod common;

use std::path::Path;

use axum::body::Bytes;
use rental_showcase_api::{
    dto::{
        categories::CreateCategoryRequest,
        products::{CreateProductRequest, UpdateProductRequest},
        showcase::{CreateDesignRequest, UpdateDesignRequest},
    },
    services::{
        category_service, design_service, product_service,
        upload_service::{self, StagedUpload},
    },
    state::AppState,
    storage::{FileStore, StagedFile},
};

fn staged(name: &str, content_type: &str) -> StagedFile {
    StagedFile {
        file_name: name.to_string(),
        content_type: Some(content_type.to_string()),
        bytes: Bytes::from_static(b"\xff\xd8\xff\xe0 not really a jpeg"),
    }
}

fn upload(folder: &str, files: Vec<StagedFile>) -> StagedUpload {
    StagedUpload {
        folder: folder.to_string(),
        watermark: false,
        files,
    }
}

fn files_in(state: &AppState, folder: &str) -> usize {
    let dir = Path::new(&state.config.upload_dir).join(folder);
    std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

fn stored_on_disk(state: &AppState, url: &str) -> bool {
    state
        .store
        .path_for_url(url)
        .map(|path| path.exists())
        .unwrap_or(false)
}

// Image batches commit all-or-nothing, and dropped or orphaned images leave the store.
#[tokio::test]
async fn image_files_follow_their_owners() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let state = common::setup_state(&database_url).await?;
    let staff = common::create_staff(&state, "admin", "admin@example.com").await?;

    let truss = category_service::create_category(
        &state,
        &staff,
        CreateCategoryRequest {
            name: "Truss".into(),
            slug: "truss".into(),
            description: None,
            image: None,
            parent_id: None,
            status: None,
            order: None,
        },
    )
    .await?
    .data
    .expect("category");
    let product_id = product_service::create_product(
        &state,
        &staff,
        CreateProductRequest {
            name: "Box Truss 3m".into(),
            slug: None,
            category_id: truss.id,
            price: None,
            price_unit: None,
            images: vec![],
            description: None,
            status: None,
            order: None,
        },
    )
    .await?
    .data
    .expect("product")
    .id;

    // One bad part: the good upload is removed and the product keeps its images.
    let failed = product_service::attach_images(
        &state,
        &staff,
        product_id,
        upload(
            "products",
            vec![staged("front.jpg", "image/jpeg"), staged("notes.txt", "text/plain")],
        ),
    )
    .await?
    .data
    .expect("result");
    assert!(failed.product.is_none());
    assert!(!failed.report.committed);
    assert_eq!(failed.report.failed(), 1);
    assert!(failed.report.urls().is_empty());
    assert!(failed.report.leftovers.is_empty());
    assert_eq!(files_in(&state, "products"), 0);
    let unchanged = product_service::get_product_admin(&state, &staff, product_id)
        .await?
        .data
        .expect("product");
    assert!(unchanged.images.is_empty());

    // Every part good: URLs are appended in upload order.
    let attached = product_service::attach_images(
        &state,
        &staff,
        product_id,
        upload(
            "products",
            vec![staged("front.jpg", "image/jpeg"), staged("side.png", "image/png")],
        ),
    )
    .await?
    .data
    .expect("result");
    assert!(attached.report.committed);
    let images = attached.product.expect("product").images;
    assert_eq!(images.len(), 2);
    assert_eq!(images, attached.report.urls());
    assert!(images.iter().all(|url| stored_on_disk(&state, url)));

    // Dropping an image from the list deletes its file after the save.
    let saved = product_service::update_product(
        &state,
        &staff,
        product_id,
        UpdateProductRequest {
            images: Some(vec![images[0].clone()]),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("saved");
    assert_eq!(saved.product.images, vec![images[0].clone()]);
    assert!(saved.cleanup_failures.is_empty());
    assert!(stored_on_disk(&state, &images[0]));
    assert!(!stored_on_disk(&state, &images[1]));

    // Standalone batches follow the same rule.
    let batch = upload_service::upload_batch(
        &state,
        &staff,
        upload(
            "gallery",
            vec![staged("stage.jpg", "image/jpeg"), staged("readme.txt", "text/plain")],
        ),
    )
    .await?
    .data
    .expect("report");
    assert!(!batch.committed);
    assert!(batch.urls().is_empty());
    assert_eq!(files_in(&state, "gallery"), 0);

    let batch = upload_service::upload_batch(
        &state,
        &staff,
        upload("gallery", vec![staged("stage.jpg", "image/jpeg")]),
    )
    .await?
    .data
    .expect("report");
    assert!(batch.committed);
    assert_eq!(files_in(&state, "gallery"), 1);

    // Deleting the category removes its products' files too.
    let deleted = category_service::delete_category(&state, &staff, truss.id)
        .await?
        .data
        .expect("deleted");
    assert_eq!(deleted.deleted_products, 1);
    assert!(deleted.cleanup_failures.is_empty());
    assert!(!stored_on_disk(&state, &images[0]));
    assert_eq!(files_in(&state, "products"), 0);

    // Replacing a design image deletes the old file and reports no failures.
    let old = state
        .store
        .put("designs", "backdrop.jpg", Bytes::from_static(b"old backdrop"))
        .await?;
    let new = state
        .store
        .put("designs", "backdrop-v2.jpg", Bytes::from_static(b"new backdrop"))
        .await?;
    let design = design_service::create_design(
        &state,
        &staff,
        CreateDesignRequest {
            title: "Wedding backdrop".into(),
            category: Some("wedding".into()),
            image: Some(old.url.clone()),
            status: None,
            order: None,
        },
    )
    .await?
    .data
    .expect("design");
    let saved = design_service::update_design(
        &state,
        &staff,
        design.id,
        UpdateDesignRequest {
            image: Some(Some(new.url.clone())),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("saved");
    assert_eq!(saved.design.image.as_deref(), Some(new.url.as_str()));
    assert!(saved.cleanup_failures.is_empty());
    assert!(!stored_on_disk(&state, &old.url));
    assert!(stored_on_disk(&state, &new.url));

    let _ = std::fs::remove_dir_all(&state.config.upload_dir);
    Ok(())
}
