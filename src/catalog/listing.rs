use sea_orm::{
    ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Select,
    sea_query::{Expr, extension::postgres::PgExpr},
};
use uuid::Uuid;

use crate::{
    entity::products::{Column, Entity as Products},
    models::STATUS_ACTIVE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingScope {
    /// Only active products.
    Public,
    /// Every product, optionally narrowed by an explicit status.
    Admin,
}

#[derive(Debug, Clone)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub scope: ListingScope,
}

impl ProductFilter {
    pub fn public(category_id: Option<Uuid>, search: Option<String>) -> Self {
        Self {
            category_id,
            search,
            status: None,
            scope: ListingScope::Public,
        }
    }

    pub fn admin(category_id: Option<Uuid>, search: Option<String>, status: Option<String>) -> Self {
        Self {
            category_id,
            search,
            status,
            scope: ListingScope::Admin,
        }
    }

    pub fn condition(&self) -> Condition {
        let mut condition = Condition::all();

        match self.scope {
            ListingScope::Public => {
                condition = condition.add(Column::Status.eq(STATUS_ACTIVE));
            }
            ListingScope::Admin => {
                if let Some(status) = self.status.as_ref().filter(|s| !s.trim().is_empty()) {
                    condition = condition.add(Column::Status.eq(status.trim()));
                }
            }
        }

        if let Some(category_id) = self.category_id {
            condition = condition.add(Column::CategoryId.eq(category_id));
        }

        if let Some(search) = self.search.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", escape_like(search));
            condition = condition.add(Expr::col(Column::Name).ilike(pattern));
        }

        condition
    }

    /// Filtered query in listing order: `sort_order` ascending, newest first on ties.
    pub fn select(&self) -> Select<Products> {
        Products::find()
            .filter(self.condition())
            .order_by_asc(Column::SortOrder)
            .order_by_desc(Column::CreatedAt)
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    fn sql(filter: &ProductFilter) -> String {
        filter.select().build(DbBackend::Postgres).to_string()
    }

    #[test]
    fn public_listing_only_sees_active_products() {
        let sql = sql(&ProductFilter::public(None, None));
        assert!(sql.contains(r#""products"."status" = 'active'"#), "{sql}");
    }

    #[test]
    fn admin_listing_ignores_status_unless_asked() {
        let unfiltered = sql(&ProductFilter::admin(None, None, None));
        assert!(!unfiltered.contains(r#""status" ="#), "{unfiltered}");

        let inactive = sql(&ProductFilter::admin(None, None, Some("inactive".into())));
        assert!(inactive.contains(r#""products"."status" = 'inactive'"#), "{inactive}");
    }

    #[test]
    fn category_filter_matches_exact_id() {
        let id = Uuid::new_v4();
        let sql = sql(&ProductFilter::public(Some(id), None));
        assert!(sql.contains(&format!(r#""products"."category_id" = '{id}'"#)), "{sql}");
    }

    #[test]
    fn search_is_case_insensitive_substring_on_name() {
        let sql = sql(&ProductFilter::public(None, Some("  Truss ".into())));
        assert!(sql.contains(r#""name" ILIKE '%Truss%'"#), "{sql}");
    }

    #[test]
    fn blank_search_adds_no_clause() {
        let sql = sql(&ProductFilter::public(None, Some("   ".into())));
        assert!(!sql.contains("ILIKE"), "{sql}");
    }

    #[test]
    fn listing_orders_by_sort_order_then_newest() {
        let sql = sql(&ProductFilter::admin(None, None, None));
        assert!(
            sql.ends_with(r#"ORDER BY "products"."sort_order" ASC, "products"."created_at" DESC"#),
            "{sql}"
        );
    }

    #[test]
    fn like_wildcards_in_search_are_escaped() {
        assert_eq!(escape_like("50%_off"), r"50\%\_off");
    }
}
