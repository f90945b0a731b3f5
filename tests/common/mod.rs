#![allow(dead_code)]

use rental_showcase_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    entity::users::ActiveModel as UserActive,
    middleware::auth::AuthUser,
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

/// Database URL for integration tests, or `None` to skip them.
pub fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests.");
            None
        }
    }
}

pub async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE products, categories, portfolios, designs, promotions, blogs, events, customers, site_settings, audit_logs, users CASCADE",
    ))
    .await?;

    let pool = create_pool(database_url).await?;
    let upload_dir = std::env::temp_dir().join(format!("rental-showcase-{}", Uuid::new_v4()));
    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        upload_dir: upload_dir.to_string_lossy().into_owned(),
        public_base_url: String::new(),
        max_upload_bytes: 1024 * 1024,
    };
    Ok(AppState::new(pool, orm, config))
}

pub async fn create_staff(state: &AppState, role: &str, email: &str) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(role.to_string()),
        email: Set(email.to_string()),
        role: Set(role.to_string()),
        position: Set(None),
        password_hash: Set("dummy".into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role: user.role,
    })
}
