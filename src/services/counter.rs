//! Atomic like/view counters shared by portfolios and designs.

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    routes::params::LikeAction,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bump {
    Like,
    Unlike,
    View,
}

impl From<LikeAction> for Bump {
    fn from(action: LikeAction) -> Self {
        match action {
            LikeAction::Like => Bump::Like,
            LikeAction::Unlike => Bump::Unlike,
        }
    }
}

/// Column names of an entity's counters.
pub struct CounterColumns<C> {
    pub id: C,
    pub likes: C,
    pub views: C,
}

/// Applies one counter change in a single UPDATE. Unlike never takes likes below zero.
pub async fn bump<E>(
    db: &DatabaseConnection,
    columns: CounterColumns<E::Column>,
    id: Uuid,
    bump: Bump,
) -> AppResult<()>
where
    E: EntityTrait,
{
    let (column, delta) = match bump {
        Bump::Like => (columns.likes, 1),
        Bump::Unlike => (columns.likes, -1),
        Bump::View => (columns.views, 1),
    };

    let mut update = E::update_many()
        .col_expr(column, Expr::col(column).add(delta))
        .filter(columns.id.eq(id));
    if delta < 0 {
        update = update.filter(column.gt(0));
    }
    let result = update.exec(db).await?;

    if result.rows_affected == 0 {
        // Either the row is missing or an unlike hit zero.
        let exists = E::find().filter(columns.id.eq(id)).one(db).await?.is_some();
        if !exists {
            return Err(AppError::NotFound);
        }
    }
    Ok(())
}
