mod common;

use chrono::{Duration, Utc};
use rental_showcase_api::{
    dto::{
        blogs::{CreateBlogRequest, UpdateBlogRequest},
        events::{CreateEventRequest, CustomerInput, LiffEventsRequest, UpdateEventRequest},
        promotions::CreatePromotionRequest,
        showcase::CreateDesignRequest,
        users::CreateUserRequest,
    },
    error::AppError,
    models::SiteSettings,
    routes::params::Pagination,
    services::{
        blog_service, counter::Bump, design_service, event_service, promotion_service,
        settings_service, user_service,
    },
};
use uuid::Uuid;

// Showcase, blog, LIFF and admin flows against a real database.
#[tokio::test]
async fn content_and_liff_flow() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let state = common::setup_state(&database_url).await?;
    let admin = common::create_staff(&state, "admin", "admin@example.com").await?;

    // Counters: like, unlike twice, view. Likes never go negative.
    let design = design_service::create_design(
        &state,
        &admin,
        CreateDesignRequest {
            title: "Stage backdrop".into(),
            category: Some("stage".into()),
            image: None,
            status: None,
            order: None,
        },
    )
    .await?
    .data
    .expect("design");
    let liked = design_service::count(&state, design.id, Bump::Like).await?.data.expect("counts");
    assert_eq!(liked.likes, 1);
    design_service::count(&state, design.id, Bump::Unlike).await?;
    let floor = design_service::count(&state, design.id, Bump::Unlike).await?.data.expect("counts");
    assert_eq!(floor.likes, 0);
    let viewed = design_service::count(&state, design.id, Bump::View).await?.data.expect("counts");
    assert_eq!(viewed.views, 1);
    let missing = design_service::count(&state, Uuid::new_v4(), Bump::View).await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    // Promotions: only the window containing today is public.
    let today = Utc::now().date_naive();
    for (title, start, end) in [
        ("Running", Some(today - Duration::days(1)), None),
        ("Expired", None, Some(today - Duration::days(1))),
    ] {
        promotion_service::create_promotion(
            &state,
            &admin,
            CreatePromotionRequest {
                title: title.into(),
                description: None,
                image: None,
                start_date: start,
                end_date: end,
                status: None,
                order: None,
            },
        )
        .await?;
    }
    let promos = promotion_service::list_promotions(&state).await?.data.expect("promos");
    assert_eq!(promos.items.len(), 1);
    assert_eq!(promos.items[0].title, "Running");
    let bad_window = promotion_service::create_promotion(
        &state,
        &admin,
        CreatePromotionRequest {
            title: "Backwards".into(),
            description: None,
            image: None,
            start_date: Some(today),
            end_date: Some(today - Duration::days(3)),
            status: None,
            order: None,
        },
    )
    .await;
    assert!(matches!(bad_window, Err(AppError::BadRequest(_))));

    // Blog: drafts are hidden until published, and publishing stamps the date once.
    let draft = blog_service::create_blog(
        &state,
        &admin,
        CreateBlogRequest {
            title: "Planning a Concert".into(),
            slug: None,
            excerpt: None,
            content: "Body".into(),
            cover_image: None,
            author: None,
            status: None,
        },
    )
    .await?
    .data
    .expect("blog");
    assert_eq!(draft.slug, "planning-a-concert");
    assert!(draft.published_at.is_none());
    let hidden = blog_service::get_published(&state, "planning-a-concert").await;
    assert!(matches!(hidden, Err(AppError::NotFound)));

    let published = blog_service::update_blog(
        &state,
        &admin,
        draft.id,
        UpdateBlogRequest {
            status: Some("published".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("blog");
    assert!(published.published_at.is_some());
    let listed = blog_service::list_published(&state, Pagination::default())
        .await?
        .data
        .expect("blogs");
    assert_eq!(listed.items.len(), 1);

    let dup = blog_service::create_blog(
        &state,
        &admin,
        CreateBlogRequest {
            title: "Planning a concert".into(),
            slug: None,
            excerpt: None,
            content: "Again".into(),
            cover_image: None,
            author: None,
            status: None,
        },
    )
    .await;
    assert!(matches!(dup, Err(AppError::Conflict(_))));

    // LIFF: unknown LINE users get an empty list; known ones see their events.
    let unknown = event_service::liff_events(
        &state,
        LiffEventsRequest {
            line_uid: "U-unknown".into(),
        },
    )
    .await?
    .data
    .expect("liff");
    assert!(unknown.customer.is_none());
    assert!(unknown.events.is_empty());

    let event = event_service::create_event(
        &state,
        &admin,
        CreateEventRequest {
            event_name: "Year-end party".into(),
            event_date: today,
            venue: Some("Grand Hall".into()),
            status: None,
            customer: Some(CustomerInput {
                line_uid: "U-123".into(),
                display_name: "Somchai".into(),
                picture_url: None,
                company_name: Some("Acme".into()),
            }),
        },
    )
    .await?
    .data
    .expect("event");
    assert_eq!(event.status, "draft");
    assert_eq!(event.invite_code.len(), 8);

    let bad_rating = event_service::update_event(
        &state,
        &admin,
        event.id,
        UpdateEventRequest {
            review_rating: Some(Some(6)),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(bad_rating, Err(AppError::BadRequest(_))));
    let reviewed = event_service::update_event(
        &state,
        &admin,
        event.id,
        UpdateEventRequest {
            status: Some("completed".into()),
            review_rating: Some(Some(5)),
            review_comment: Some("Great screen".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("event");
    assert_eq!(reviewed.review.map(|r| r.rating), Some(5));

    let mine = event_service::liff_events(
        &state,
        LiffEventsRequest {
            line_uid: "U-123".into(),
        },
    )
    .await?
    .data
    .expect("liff");
    assert_eq!(mine.customer.map(|c| c.display_name), Some("Somchai".to_string()));
    assert_eq!(mine.events.len(), 1);

    // Users: unique email, no self-delete, sales staff cannot manage users.
    let sales = user_service::create_user(
        &state,
        &admin,
        CreateUserRequest {
            name: "Sales".into(),
            email: "Sales@Example.com".into(),
            password: "sales-pass-1".into(),
            role: Some("sales".into()),
            position: None,
        },
    )
    .await?
    .data
    .expect("user");
    assert_eq!(sales.email, "sales@example.com");
    let taken = user_service::create_user(
        &state,
        &admin,
        CreateUserRequest {
            name: "Other".into(),
            email: "sales@example.com".into(),
            password: "other-pass-1".into(),
            role: None,
            position: None,
        },
    )
    .await;
    assert!(matches!(taken, Err(AppError::Conflict(_))));
    let own = user_service::delete_user(&state, &admin, admin.user_id).await;
    assert!(matches!(own, Err(AppError::BadRequest(_))));

    let sales_auth = rental_showcase_api::middleware::auth::AuthUser {
        user_id: sales.id,
        role: sales.role.clone(),
    };
    let forbidden = user_service::list_users(&state, &sales_auth).await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));

    // Settings upsert keeps untouched keys.
    let mut first = SiteSettings::default();
    first.values.insert("site_name".into(), "Rental".into());
    first.values.insert("phone".into(), "02-000".into());
    settings_service::update_settings(&state, &admin, first).await?;
    let mut second = SiteSettings::default();
    second.values.insert("phone".into(), "02-111".into());
    let saved = settings_service::update_settings(&state, &admin, second)
        .await?
        .data
        .expect("settings");
    assert_eq!(saved.values.get("site_name").map(String::as_str), Some("Rental"));
    assert_eq!(saved.values.get("phone").map(String::as_str), Some("02-111"));

    Ok(())
}
