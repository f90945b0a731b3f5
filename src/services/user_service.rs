use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit,
    dto::Deleted,
    dto::users::{CreateUserRequest, UpdateUserRequest, UserList},
    entity::users::{ActiveModel, Column, Entity as Users},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{User, require, validate_role},
    response::{ApiResponse, Meta},
    services::auth_service::hash_password,
    state::AppState,
};

const DEFAULT_ROLE: &str = "sales";

fn normalize_email(email: &str) -> AppResult<String> {
    let email = require("email", email)?.to_lowercase();
    if !email.contains('@') {
        return Err(AppError::BadRequest("email is not valid".into()));
    }
    Ok(email)
}

async fn ensure_email_free(state: &AppState, email: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut finder = Users::find().filter(Column::Email.eq(email));
    if let Some(id) = except {
        finder = finder.filter(Column::Id.ne(id));
    }
    if finder.one(&state.orm).await?.is_some() {
        return Err(AppError::Conflict(format!("email '{email}' is already registered")));
    }
    Ok(())
}

pub async fn list_users(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let items: Vec<User> = Users::find()
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(User::from)
        .collect();
    let total = items.len() as i64;

    Ok(ApiResponse::success(
        "Users",
        UserList { items },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn create_user(
    state: &AppState,
    user: &AuthUser,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    let name = require("name", &payload.name)?;
    let email = normalize_email(&payload.email)?;
    let role = payload.role.unwrap_or_else(|| DEFAULT_ROLE.to_string());
    validate_role(&role)?;
    let password_hash = hash_password(&payload.password)?;
    ensure_email_free(state, &email, None).await?;

    let created = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email),
        role: Set(role),
        position: Set(payload.position),
        password_hash: Set(password_hash),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        state,
        user,
        "user_create",
        "users",
        serde_json::json!({ "target_user_id": created.id, "role": created.role }),
    )
    .await;

    Ok(ApiResponse::success(
        "User created",
        created.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    let existing = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(require("name", &name)?);
    }
    if let Some(email) = payload.email {
        let email = normalize_email(&email)?;
        ensure_email_free(state, &email, Some(id)).await?;
        active.email = Set(email);
    }
    if let Some(password) = payload.password.filter(|p| !p.is_empty()) {
        active.password_hash = Set(hash_password(&password)?);
    }
    if let Some(role) = payload.role {
        validate_role(&role)?;
        active.role = Set(role);
    }
    if let Some(position) = payload.position {
        active.position = Set(Some(position));
    }

    let updated = active.update(&state.orm).await?;

    audit::record(
        state,
        user,
        "user_update",
        "users",
        serde_json::json!({ "target_user_id": updated.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        updated.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Deleted>> {
    ensure_admin(user)?;
    if user.user_id == id {
        return Err(AppError::BadRequest("you cannot delete your own account".into()));
    }
    let result = Users::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        state,
        user,
        "user_delete",
        "users",
        serde_json::json!({ "target_user_id": id }),
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
    use super::normalize_email;

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Sales@Example.COM ").unwrap(), "sales@example.com");
        assert!(normalize_email("not-an-email").is_err());
        assert!(normalize_email("   ").is_err());
    }
}
