use chrono::{NaiveDate, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::Deleted,
    dto::promotions::{CreatePromotionRequest, PromotionList, UpdatePromotionRequest},
    entity::promotions::{ActiveModel, Column, Entity as Promotions},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::{Promotion, STATUS_ACTIVE, require, validate_status},
    response::{ApiResponse, Meta},
    state::AppState,
};

fn check_window(start: Option<NaiveDate>, end: Option<NaiveDate>) -> AppResult<()> {
    match (start, end) {
        (Some(start), Some(end)) if start > end => Err(AppError::BadRequest(
            "startDate must not be after endDate".into(),
        )),
        _ => Ok(()),
    }
}

/// Active promotions whose date window contains `today`. Missing bounds are open.
fn running_on(today: NaiveDate) -> Condition {
    Condition::all()
        .add(Column::Status.eq(STATUS_ACTIVE))
        .add(
            Condition::any()
                .add(Column::StartDate.is_null())
                .add(Column::StartDate.lte(today)),
        )
        .add(
            Condition::any()
                .add(Column::EndDate.is_null())
                .add(Column::EndDate.gte(today)),
        )
}

pub async fn list_promotions(state: &AppState) -> AppResult<ApiResponse<PromotionList>> {
    let today = Utc::now().date_naive();
    let items: Vec<Promotion> = Promotions::find()
        .filter(running_on(today))
        .order_by_asc(Column::SortOrder)
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Promotion::from)
        .collect();

    Ok(ApiResponse::success(
        "Promotions",
        PromotionList { items },
        Some(Meta::empty()),
    ))
}

pub async fn list_promotions_admin(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<PromotionList>> {
    ensure_staff(user)?;
    let items: Vec<Promotion> = Promotions::find()
        .order_by_asc(Column::SortOrder)
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Promotion::from)
        .collect();
    let total = items.len() as i64;

    Ok(ApiResponse::success(
        "Promotions",
        PromotionList { items },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn create_promotion(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePromotionRequest,
) -> AppResult<ApiResponse<Promotion>> {
    ensure_staff(user)?;
    let title = require("title", &payload.title)?;
    check_window(payload.start_date, payload.end_date)?;
    let status = payload.status.unwrap_or_else(|| STATUS_ACTIVE.to_string());
    validate_status(&status)?;

    let promotion = ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        description: Set(payload.description),
        image: Set(payload.image),
        start_date: Set(payload.start_date),
        end_date: Set(payload.end_date),
        status: Set(status),
        sort_order: Set(payload.order.unwrap_or(0)),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        state,
        user,
        "promotion_create",
        "promotions",
        serde_json::json!({ "promotion_id": promotion.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Promotion created",
        promotion.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_promotion(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdatePromotionRequest,
) -> AppResult<ApiResponse<Promotion>> {
    ensure_staff(user)?;
    let existing = Promotions::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let start_date = payload.start_date.unwrap_or(existing.start_date);
    let end_date = payload.end_date.unwrap_or(existing.end_date);
    check_window(start_date, end_date)?;

    let mut active: ActiveModel = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(require("title", &title)?);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(image) = payload.image {
        active.image = Set(Some(image));
    }
    if let Some(status) = payload.status {
        validate_status(&status)?;
        active.status = Set(status);
    }
    if let Some(order) = payload.order {
        active.sort_order = Set(order);
    }
    active.start_date = Set(start_date);
    active.end_date = Set(end_date);

    let promotion = active.update(&state.orm).await?;

    audit::record(
        state,
        user,
        "promotion_update",
        "promotions",
        serde_json::json!({ "promotion_id": promotion.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        promotion.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_promotion(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Deleted>> {
    ensure_staff(user)?;
    let result = Promotions::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        state,
        user,
        "promotion_delete",
        "promotions",
        serde_json::json!({ "promotion_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        Deleted::new(id),
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use sea_orm::{DbBackend, QueryTrait};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn window_rejects_start_after_end() {
        assert!(check_window(Some(date(2025, 5, 2)), Some(date(2025, 5, 1))).is_err());
        assert!(check_window(Some(date(2025, 5, 1)), Some(date(2025, 5, 1))).is_ok());
        assert!(check_window(None, Some(date(2025, 5, 1))).is_ok());
        assert!(check_window(Some(date(2025, 5, 1)), None).is_ok());
    }

    #[test]
    fn running_filter_treats_missing_bounds_as_open() {
        let sql = Promotions::find()
            .filter(running_on(date(2025, 5, 1)))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains(r#""start_date" IS NULL"#));
        assert!(sql.contains(r#""end_date" IS NULL"#));
        assert!(sql.contains(r#""status" = 'active'"#));
    }
}
