pub mod appointments;
pub mod auth;
pub mod availability;
pub mod barbers;
pub mod barbershops;
pub mod customers;
pub mod health;
pub mod landing;
pub mod public;
pub mod services;

use axum::http::HeaderMap;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::services::auth::{decode_token, Claims, Role};

/// Pull and verify the bearer token; all protected handlers start here.
pub(crate) fn authenticate(headers: &HeaderMap, config: &AppConfig) -> Result<Claims, AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token.is_empty() {
        return Err(AppError::Unauthorized);
    }
    decode_token(token, config).ok_or(AppError::Unauthorized)
}

pub(crate) fn require_role(claims: &Claims, role: Role) -> Result<(), AppError> {
    if claims.role() == Some(role) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

pub(crate) fn require_any_role(claims: &Claims, roles: &[Role]) -> Result<Role, AppError> {
    match claims.role() {
        Some(role) if roles.contains(&role) => Ok(role),
        _ => Err(AppError::Forbidden),
    }
}

/// The tenant a token is scoped to. Central-admin tokens carry none and are
/// rejected here; tenant endpoints are not theirs to call.
pub(crate) fn require_tenant(claims: &Claims) -> Result<String, AppError> {
    claims.barbershop_id.clone().ok_or(AppError::Forbidden)
}
