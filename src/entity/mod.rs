pub mod audit_logs;
pub mod blogs;
pub mod categories;
pub mod customers;
pub mod designs;
pub mod events;
pub mod portfolios;
pub mod products;
pub mod promotions;
pub mod site_settings;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use blogs::Entity as Blogs;
pub use categories::Entity as Categories;
pub use customers::Entity as Customers;
pub use designs::Entity as Designs;
pub use events::Entity as Events;
pub use portfolios::Entity as Portfolios;
pub use products::Entity as Products;
pub use promotions::Entity as Promotions;
pub use site_settings::Entity as SiteSettings;
pub use users::Entity as Users;
