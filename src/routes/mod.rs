use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod blogs;
pub mod categories;
pub mod designs;
pub mod doc;
pub mod events;
pub mod health;
pub mod liff;
pub mod params;
pub mod portfolios;
pub mod products;
pub mod promotions;
pub mod settings;
pub mod upload;
pub mod users;

fn admin_router() -> Router<AppState> {
    Router::new()
        .nest("/categories", categories::admin_router())
        .nest("/products", products::admin_router())
        .nest("/portfolios", portfolios::admin_router())
        .nest("/designs", designs::admin_router())
        .nest("/promotions", promotions::admin_router())
        .nest("/blogs", blogs::admin_router())
        .nest("/events", events::admin_router())
        .nest("/users", users::admin_router())
        .nest("/settings", settings::admin_router())
}

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/categories", categories::router())
        .nest("/products", products::router())
        .nest("/portfolios", portfolios::router())
        .nest("/designs", designs::router())
        .nest("/promotions", promotions::router())
        .nest("/blogs", blogs::router())
        .nest("/liff", liff::router())
        .nest("/settings", settings::router())
        .nest("/upload", upload::router())
        .nest("/admin", admin_router())
}
