use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError, state::AppState};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
}

pub fn ensure_role(user: &AuthUser, roles: &[&str]) -> Result<(), AppError> {
    if !roles.contains(&user.role.as_str()) {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, &["admin"])
}

/// Admin dashboard access: admins and sales staff.
pub fn ensure_staff(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, &["admin", "sales"])
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AppError::Unauthorized)?;

        let auth_str = auth_header.to_str().map_err(|_| AppError::Unauthorized)?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or(AppError::Unauthorized)?;

        decode_token(token, &state.config.jwt_secret)
    }
}

pub fn decode_token(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    if secret.is_empty() {
        return Err(AppError::Unauthorized);
    }
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized)?;

    let user_id = Uuid::parse_str(&decoded.claims.sub).map_err(|_| AppError::Unauthorized)?;

    Ok(AuthUser {
        user_id,
        role: decoded.claims.role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role: role.to_string(),
        }
    }

    #[test]
    fn staff_includes_sales_but_admin_does_not() {
        assert!(ensure_staff(&user("sales")).is_ok());
        assert!(ensure_staff(&user("admin")).is_ok());
        assert!(ensure_staff(&user("user")).is_err());
        assert!(ensure_admin(&user("sales")).is_err());
    }

    #[test]
    fn tokens_round_trip_through_issue_and_decode() {
        let id = Uuid::new_v4();
        let token = crate::services::auth_service::issue_token(id, "admin", "secret").unwrap();
        let decoded = decode_token(&token, "secret").unwrap();
        assert_eq!(decoded.user_id, id);
        assert_eq!(decoded.role, "admin");

        assert!(decode_token(&token, "other").is_err());
        assert!(decode_token(&token, "").is_err());
    }
}
