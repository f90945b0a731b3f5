use chrono::Utc;
use sea_orm::{EntityTrait, QueryOrder, Set, sea_query::OnConflict};

use crate::{
    audit,
    entity::site_settings::{ActiveModel, Column, Entity as SiteSettingsEntity},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::SiteSettings,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn get_settings(state: &AppState) -> AppResult<ApiResponse<SiteSettings>> {
    let values = SiteSettingsEntity::find()
        .order_by_asc(Column::Key)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|row| (row.key, row.value))
        .collect();

    Ok(ApiResponse::success(
        "Settings",
        SiteSettings { values },
        None,
    ))
}

/// Upserts every key in the body. Keys not present are left untouched.
pub async fn update_settings(
    state: &AppState,
    user: &AuthUser,
    payload: SiteSettings,
) -> AppResult<ApiResponse<SiteSettings>> {
    ensure_admin(user)?;
    if payload.values.keys().any(|key| key.trim().is_empty()) {
        return Err(AppError::BadRequest("setting keys must not be blank".into()));
    }

    if !payload.values.is_empty() {
        let now = Utc::now();
        let rows = payload.values.iter().map(|(key, value)| ActiveModel {
            key: Set(key.trim().to_string()),
            value: Set(value.clone()),
            updated_at: Set(now.into()),
        });
        SiteSettingsEntity::insert_many(rows)
            .on_conflict(
                OnConflict::column(Column::Key)
                    .update_columns([Column::Value, Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&state.orm)
            .await?;
    }

    let keys: Vec<&String> = payload.values.keys().collect();
    audit::record(
        state,
        user,
        "settings_update",
        "site_settings",
        serde_json::json!({ "keys": keys }),
    )
    .await;

    let mut response = get_settings(state).await?;
    response.message = "Settings saved".to_string();
    response.meta = Some(Meta::empty());
    Ok(response)
}
