use rental_showcase_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    services::auth_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    let pool = create_pool(&config.database_url).await?;

    let admin_id = ensure_user(&pool, "Admin", "admin@example.com", "admin12345", "admin").await?;
    let sales_id = ensure_user(&pool, "Sales", "sales@example.com", "sales12345", "sales").await?;
    seed_catalog(&pool).await?;
    seed_settings(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, Sales ID: {sales_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    name: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn ensure_category(
    pool: &sqlx::PgPool,
    parent_id: Option<Uuid>,
    name: &str,
    slug: &str,
    order: i32,
) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> = sqlx::query_as(
        "SELECT id FROM categories WHERE parent_id IS NOT DISTINCT FROM $1 AND lower(slug) = $2",
    )
    .bind(parent_id)
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO categories (id, name, slug, parent_id, sort_order)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(slug)
    .bind(parent_id)
    .bind(order)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let led = ensure_category(pool, None, "LED Screen", "led", 1).await?;
    let indoor = ensure_category(pool, Some(led), "Indoor LED", "indoor", 1).await?;
    let outdoor = ensure_category(pool, Some(led), "Outdoor LED", "outdoor", 2).await?;
    let sound = ensure_category(pool, None, "Sound System", "sound", 2).await?;

    let products = vec![
        (indoor, "P3.9 Indoor Panel", "p3-9-indoor-panel", "per sqm/day"),
        (outdoor, "P4.8 Outdoor Panel", "p4-8-outdoor-panel", "per sqm/day"),
        (sound, "Line Array Set", "line-array-set", "per day"),
    ];

    for (category_id, name, slug, unit) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, slug, category_id, price_unit)
            SELECT $1, $2, $3, $4, $5
            WHERE NOT EXISTS (SELECT 1 FROM products WHERE category_id = $4 AND slug = $3)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slug)
        .bind(category_id)
        .bind(unit)
        .execute(pool)
        .await?;
    }

    println!("Seeded catalog");
    Ok(())
}

async fn seed_settings(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let settings = [
        ("site_name", "Event Rental Showcase"),
        ("contact_phone", ""),
        ("line_official_id", ""),
    ];
    for (key, value) in settings {
        sqlx::query(
            "INSERT INTO site_settings (key, value) VALUES ($1, $2) ON CONFLICT (key) DO NOTHING",
        )
        .bind(key)
        .bind(value)
        .execute(pool)
        .await?;
    }
    println!("Seeded settings");
    Ok(())
}
