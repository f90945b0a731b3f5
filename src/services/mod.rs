pub mod auth_service;
pub mod blog_service;
pub mod catalog_service;
pub mod category_service;
pub mod counter;
pub mod design_service;
pub mod event_service;
pub mod portfolio_service;
pub mod product_service;
pub mod promotion_service;
pub mod settings_service;
pub mod upload_service;
pub mod user_service;
