//! Category hierarchy: slug path resolution, breadcrumbs and the two-level
//! catalog tree.
//!
//! Categories form a tree through `parent_id`. Slugs are unique among
//! siblings only, so a slug is meaningful only together with its parent.

use std::collections::{HashMap, HashSet};

use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    sea_query::{Expr, Func},
};
use uuid::Uuid;

use crate::{
    entity::categories::{Column, Entity as Categories, Model as CategoryModel},
    error::{AppError, AppResult},
    models::{BreadcrumbItem, STATUS_ACTIVE},
};

/// Which categories a lookup may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Storefront: inactive categories do not exist.
    Public,
    /// Admin: every category is reachable.
    All,
}

impl Visibility {
    pub fn admits(self, category: &CategoryModel) -> bool {
        match self {
            Visibility::Public => category.status == STATUS_ACTIVE,
            Visibility::All => true,
        }
    }
}

/// Lookup of single categories by parent and slug, or by id.
#[allow(async_fn_in_trait)]
pub trait CategorySource {
    /// Child of `parent` (a root when `None`) whose slug equals `slug`, ignoring case.
    async fn child_by_slug(
        &self,
        parent: Option<Uuid>,
        slug: &str,
    ) -> AppResult<Option<CategoryModel>>;

    async fn by_id(&self, id: Uuid) -> AppResult<Option<CategoryModel>>;
}

impl CategorySource for DatabaseConnection {
    async fn child_by_slug(
        &self,
        parent: Option<Uuid>,
        slug: &str,
    ) -> AppResult<Option<CategoryModel>> {
        let parent_cond = match parent {
            Some(id) => Column::ParentId.eq(id),
            None => Column::ParentId.is_null(),
        };
        let found = Categories::find()
            .filter(parent_cond)
            .filter(Expr::expr(Func::lower(Expr::col(Column::Slug))).eq(slug.to_lowercase()))
            .order_by_asc(Column::SortOrder)
            .one(self)
            .await?;
        Ok(found)
    }

    async fn by_id(&self, id: Uuid) -> AppResult<Option<CategoryModel>> {
        Ok(Categories::find_by_id(id).one(self).await?)
    }
}

/// In-memory view of the full category list, indexed by id and by parent id.
///
/// Children under each parent keep the order of the input list.
#[derive(Debug, Default, Clone)]
pub struct CategoryIndex {
    by_id: HashMap<Uuid, CategoryModel>,
    children: HashMap<Option<Uuid>, Vec<Uuid>>,
}

impl CategoryIndex {
    pub fn new(categories: Vec<CategoryModel>) -> Self {
        let mut index = Self::default();
        for category in categories {
            index
                .children
                .entry(category.parent_id)
                .or_default()
                .push(category.id);
            index.by_id.insert(category.id, category);
        }
        index
    }

    /// Loads every category ordered by `sort_order`, then name.
    pub async fn load<C: ConnectionTrait>(db: &C) -> AppResult<Self> {
        let categories = Categories::find()
            .order_by_asc(Column::SortOrder)
            .order_by_asc(Column::Name)
            .all(db)
            .await?;
        Ok(Self::new(categories))
    }

    pub fn get(&self, id: Uuid) -> Option<&CategoryModel> {
        self.by_id.get(&id)
    }

    pub fn children_of(&self, parent: Option<Uuid>) -> impl Iterator<Item = &CategoryModel> {
        self.children
            .get(&parent)
            .into_iter()
            .flatten()
            .filter_map(|id| self.by_id.get(id))
    }

    pub fn child_count(&self, id: Uuid) -> usize {
        self.children.get(&Some(id)).map_or(0, Vec::len)
    }

    /// True when `candidate` is `id` itself or sits anywhere below it.
    pub fn is_self_or_descendant(&self, id: Uuid, candidate: Uuid) -> bool {
        let mut stack = vec![id];
        let mut seen = HashSet::new();
        while let Some(current) = stack.pop() {
            if current == candidate {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(kids) = self.children.get(&Some(current)) {
                stack.extend(kids.iter().copied());
            }
        }
        false
    }

    /// Another category under `parent` already using `slug` (case-insensitive).
    pub fn sibling_with_slug(
        &self,
        parent: Option<Uuid>,
        slug: &str,
        except: Option<Uuid>,
    ) -> Option<&CategoryModel> {
        self.children_of(parent)
            .filter(|c| Some(c.id) != except)
            .find(|c| c.slug.eq_ignore_ascii_case(slug))
    }
}

impl CategorySource for CategoryIndex {
    async fn child_by_slug(
        &self,
        parent: Option<Uuid>,
        slug: &str,
    ) -> AppResult<Option<CategoryModel>> {
        Ok(self
            .children_of(parent)
            .find(|c| c.slug.eq_ignore_ascii_case(slug))
            .cloned())
    }

    async fn by_id(&self, id: Uuid) -> AppResult<Option<CategoryModel>> {
        Ok(self.by_id.get(&id).cloned())
    }
}

/// Splits a `led/indoor` style path into trimmed, non-empty segments.
pub fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Walks `segments` from the roots down, one sibling-scoped slug lookup per
/// segment. Returns the matched chain, root first, or `None` when any
/// segment has no visible match at its level. An empty path never matches.
pub async fn resolve_path<S: CategorySource>(
    source: &S,
    segments: &[String],
    visibility: Visibility,
) -> AppResult<Option<Vec<CategoryModel>>> {
    if segments.is_empty() {
        return Ok(None);
    }

    let mut chain: Vec<CategoryModel> = Vec::with_capacity(segments.len());
    for segment in segments {
        let parent = chain.last().map(|c| c.id);
        match source.child_by_slug(parent, segment).await? {
            Some(category) if visibility.admits(&category) => chain.push(category),
            _ => return Ok(None),
        }
    }
    Ok(Some(chain))
}

/// Resolves a path down to its leaf category, failing with `NotFound`.
pub async fn resolve_leaf<S: CategorySource>(
    source: &S,
    segments: &[String],
    visibility: Visibility,
) -> AppResult<CategoryModel> {
    resolve_path(source, segments, visibility)
        .await?
        .and_then(|mut chain| chain.pop())
        .ok_or(AppError::NotFound)
}

/// Root-to-leaf `{name, slug}` list ending at `leaf`, built by following
/// parent links. A parent loop or a dangling parent id is reported as an
/// internal error.
pub async fn build_breadcrumb<S: CategorySource>(
    source: &S,
    leaf: &CategoryModel,
) -> AppResult<Vec<BreadcrumbItem>> {
    let mut crumbs = vec![BreadcrumbItem {
        name: leaf.name.clone(),
        slug: leaf.slug.clone(),
    }];
    let mut visited = HashSet::from([leaf.id]);
    let mut next = leaf.parent_id;

    while let Some(parent_id) = next {
        if !visited.insert(parent_id) {
            return Err(AppError::Internal(anyhow::anyhow!(
                "category {parent_id} is its own ancestor"
            )));
        }
        let parent = source.by_id(parent_id).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("category parent {parent_id} is missing"))
        })?;
        crumbs.push(BreadcrumbItem {
            name: parent.name.clone(),
            slug: parent.slug.clone(),
        });
        next = parent.parent_id;
    }

    crumbs.reverse();
    Ok(crumbs)
}

/// A root category with its direct children.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup {
    pub category: CategoryModel,
    pub children: Vec<CategoryModel>,
}

/// Groups a flat list into roots and their direct children. Deeper levels are
/// left out. Both levels keep the input order.
pub fn aggregate_tree(categories: &[CategoryModel]) -> Vec<CategoryGroup> {
    let mut by_parent: HashMap<Uuid, Vec<CategoryModel>> = HashMap::new();
    for category in categories {
        if let Some(parent_id) = category.parent_id {
            by_parent.entry(parent_id).or_default().push(category.clone());
        }
    }

    categories
        .iter()
        .filter(|c| c.parent_id.is_none())
        .map(|root| CategoryGroup {
            category: root.clone(),
            children: by_parent.remove(&root.id).unwrap_or_default(),
        })
        .collect()
}

/// Rejects moving `id` under itself or one of its descendants.
pub fn check_reparent(index: &CategoryIndex, id: Uuid, new_parent: Option<Uuid>) -> AppResult<()> {
    let Some(parent_id) = new_parent else {
        return Ok(());
    };
    if index.get(parent_id).is_none() {
        return Err(AppError::BadRequest("parent category does not exist".into()));
    }
    if index.is_self_or_descendant(id, parent_id) {
        return Err(AppError::BadRequest(
            "a category cannot be moved under itself or its descendants".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn category(name: &str, slug: &str, parent: Option<&CategoryModel>, order: i32) -> CategoryModel {
        let ts = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .unwrap();
        CategoryModel {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: slug.to_string(),
            description: None,
            image: None,
            parent_id: parent.map(|p| p.id),
            status: STATUS_ACTIVE.to_string(),
            sort_order: order,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn path(p: &str) -> Vec<String> {
        split_path(p)
    }

    struct Fixture {
        led: CategoryModel,
        indoor: CategoryModel,
        outdoor_fixed: CategoryModel,
        lighting: CategoryModel,
        lighting_indoor: CategoryModel,
        index: CategoryIndex,
    }

    // led -> indoor, led -> fixed -> (none); lighting -> indoor
    fn fixture() -> Fixture {
        let led = category("LED Screen", "led", None, 1);
        let lighting = category("Lighting", "lighting", None, 2);
        let indoor = category("Indoor", "indoor", Some(&led), 1);
        let outdoor_fixed = category("Fixed Outdoor", "fixed", Some(&indoor), 1);
        let lighting_indoor = category("Indoor Lights", "indoor", Some(&lighting), 1);
        let index = CategoryIndex::new(vec![
            led.clone(),
            lighting.clone(),
            indoor.clone(),
            outdoor_fixed.clone(),
            lighting_indoor.clone(),
        ]);
        Fixture {
            led,
            indoor,
            outdoor_fixed,
            lighting,
            lighting_indoor,
            index,
        }
    }

    #[tokio::test]
    async fn resolves_root_to_leaf_with_breadcrumb() {
        let fx = fixture();
        let leaf = resolve_leaf(&fx.index, &path("led/indoor"), Visibility::Public)
            .await
            .unwrap();
        assert_eq!(leaf.id, fx.indoor.id);

        let crumbs = build_breadcrumb(&fx.index, &leaf).await.unwrap();
        let slugs: Vec<_> = crumbs.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, ["led", "indoor"]);
        assert_eq!(crumbs[0].name, "LED Screen");
    }

    #[tokio::test]
    async fn every_path_in_the_tree_resolves_with_matching_breadcrumb() {
        let fx = fixture();
        for (p, expected) in [
            ("led", fx.led.id),
            ("lighting", fx.lighting.id),
            ("led/indoor", fx.indoor.id),
            ("led/indoor/fixed", fx.outdoor_fixed.id),
            ("lighting/indoor", fx.lighting_indoor.id),
        ] {
            let segments = path(p);
            let leaf = resolve_leaf(&fx.index, &segments, Visibility::Public)
                .await
                .unwrap();
            assert_eq!(leaf.id, expected, "path {p}");

            let crumbs = build_breadcrumb(&fx.index, &leaf).await.unwrap();
            assert_eq!(crumbs.len(), segments.len());
            let slugs: Vec<_> = crumbs.into_iter().map(|c| c.slug).collect();
            assert_eq!(slugs, segments);
        }
    }

    #[tokio::test]
    async fn slugs_match_case_insensitively() {
        let fx = fixture();
        let leaf = resolve_leaf(&fx.index, &path("LED/InDoor"), Visibility::Public)
            .await
            .unwrap();
        assert_eq!(leaf.id, fx.indoor.id);
    }

    #[tokio::test]
    async fn unknown_child_segment_is_not_found() {
        let fx = fixture();
        let err = resolve_leaf(&fx.index, &path("led/outdoor"), Visibility::Public)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn unknown_root_fails_even_if_deeper_slug_exists_elsewhere() {
        let fx = fixture();
        let resolved = resolve_path(&fx.index, &path("sound/indoor"), Visibility::Public)
            .await
            .unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn segments_do_not_skip_levels() {
        let fx = fixture();
        // "fixed" lives under led/indoor, not directly under led.
        let resolved = resolve_path(&fx.index, &path("led/fixed"), Visibility::Public)
            .await
            .unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn empty_path_is_not_found() {
        let fx = fixture();
        assert!(
            resolve_path(&fx.index, &path(" / "), Visibility::All)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn inactive_categories_are_hidden_from_public_lookups_only() {
        let led = category("LED Screen", "led", None, 1);
        let mut indoor = category("Indoor", "indoor", Some(&led), 1);
        indoor.status = "inactive".into();
        let index = CategoryIndex::new(vec![led, indoor.clone()]);

        let public = resolve_path(&index, &path("led/indoor"), Visibility::Public)
            .await
            .unwrap();
        assert!(public.is_none());

        let admin = resolve_leaf(&index, &path("led/indoor"), Visibility::All)
            .await
            .unwrap();
        assert_eq!(admin.id, indoor.id);
    }

    #[tokio::test]
    async fn inactive_ancestor_hides_active_leaf() {
        let mut led = category("LED Screen", "led", None, 1);
        led.status = "inactive".into();
        let indoor = category("Indoor", "indoor", Some(&led), 1);
        let index = CategoryIndex::new(vec![led, indoor]);

        assert!(
            resolve_path(&index, &path("led/indoor"), Visibility::Public)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn root_breadcrumb_is_itself() {
        let fx = fixture();
        let crumbs = build_breadcrumb(&fx.index, &fx.led).await.unwrap();
        assert_eq!(
            crumbs,
            vec![BreadcrumbItem {
                name: "LED Screen".into(),
                slug: "led".into()
            }]
        );
    }

    #[tokio::test]
    async fn breadcrumb_stops_on_parent_loop() {
        let mut a = category("A", "a", None, 1);
        let mut b = category("B", "b", None, 1);
        a.parent_id = Some(b.id);
        b.parent_id = Some(a.id);
        let index = CategoryIndex::new(vec![a.clone(), b]);

        let err = build_breadcrumb(&index, &a).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn aggregate_groups_children_under_their_roots() {
        let fx = fixture();
        let flat = vec![
            fx.led.clone(),
            fx.lighting.clone(),
            fx.indoor.clone(),
            fx.outdoor_fixed.clone(),
            fx.lighting_indoor.clone(),
        ];
        let groups = aggregate_tree(&flat);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category.id, fx.led.id);
        assert_eq!(groups[1].category.id, fx.lighting.id);

        for group in &groups {
            assert!(group.children.iter().all(|c| c.parent_id == Some(group.category.id)));
        }
        assert_eq!(groups[0].children, vec![fx.indoor.clone()]);
        assert_eq!(groups[1].children, vec![fx.lighting_indoor.clone()]);

        // The grandchild is only reachable by path.
        let placed: Vec<Uuid> = groups
            .iter()
            .flat_map(|g| g.children.iter().map(|c| c.id))
            .collect();
        assert!(!placed.contains(&fx.outdoor_fixed.id));
    }

    #[test]
    fn aggregate_keeps_every_direct_child_once() {
        let roots: Vec<_> = (0..3)
            .map(|i| category(&format!("Root {i}"), &format!("root-{i}"), None, i))
            .collect();
        let mut flat = roots.clone();
        for (i, root) in roots.iter().enumerate() {
            for j in 0..=i {
                flat.push(category(&format!("Child {i}{j}"), &format!("child-{j}"), Some(root), j as i32));
            }
        }

        let groups = aggregate_tree(&flat);
        assert_eq!(groups.len(), 3);
        let total: usize = groups.iter().map(|g| g.children.len()).sum();
        assert_eq!(total, 6);
        for (i, group) in groups.iter().enumerate() {
            assert_eq!(group.children.len(), i + 1);
            let orders: Vec<_> = group.children.iter().map(|c| c.sort_order).collect();
            assert_eq!(orders, (0..=i as i32).collect::<Vec<_>>());
        }
    }

    #[test]
    fn reparent_under_descendant_is_rejected() {
        let fx = fixture();
        assert!(check_reparent(&fx.index, fx.led.id, Some(fx.outdoor_fixed.id)).is_err());
        assert!(check_reparent(&fx.index, fx.led.id, Some(fx.led.id)).is_err());
        assert!(check_reparent(&fx.index, fx.outdoor_fixed.id, Some(fx.lighting.id)).is_ok());
        assert!(check_reparent(&fx.index, fx.indoor.id, None).is_ok());
        assert!(check_reparent(&fx.index, fx.indoor.id, Some(Uuid::new_v4())).is_err());
    }

    #[test]
    fn sibling_slug_lookup_is_scoped_to_parent() {
        let fx = fixture();
        assert!(fx.index.sibling_with_slug(Some(fx.led.id), "INDOOR", None).is_some());
        assert!(
            fx.index
                .sibling_with_slug(Some(fx.led.id), "indoor", Some(fx.indoor.id))
                .is_none()
        );
        assert!(fx.index.sibling_with_slug(None, "indoor", None).is_none());
        assert_eq!(fx.index.child_count(fx.led.id), 1);
        assert_eq!(fx.index.child_count(fx.outdoor_fixed.id), 0);
    }
}
