//! Product catalog logic shared by the public storefront and the admin screens.

pub mod images;
pub mod listing;
pub mod tree;

pub use images::{ImageChanges, ImageDraft};
pub use listing::{ListingScope, ProductFilter};
pub use tree::{
    CategoryGroup, CategoryIndex, CategorySource, Visibility, aggregate_tree, build_breadcrumb,
    resolve_leaf, resolve_path, split_path,
};
