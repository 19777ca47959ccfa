use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Barber;
use crate::services::auth::{self, Role};
use crate::services::validation::{non_empty, valid_email, Validator};
use crate::state::AppState;

// GET /api/barbers
pub async fn list_barbers(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Barber>>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    super::require_any_role(&claims, &[Role::ShopAdmin, Role::Barber, Role::Customer])?;
    let shop_id = super::require_tenant(&claims)?;

    let barbers = {
        let db = state.db.lock().unwrap();
        queries::barbers::list_barbers(&db, &shop_id)?
    };
    Ok(Json(barbers))
}

// POST /api/barbers
#[derive(Deserialize)]
pub struct CreateBarberRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

pub async fn create_barber(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateBarberRequest>,
) -> Result<Json<Barber>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    super::require_role(&claims, Role::ShopAdmin)?;
    let shop_id = super::require_tenant(&claims)?;

    let mut v = Validator::new();
    v.check(
        body.name.as_deref().map(non_empty).unwrap_or(false),
        "name",
        "name is required",
    );
    v.check(
        body.email.as_deref().map(valid_email).unwrap_or(false),
        "email",
        "a valid email is required",
    );
    v.check(
        body.password.as_deref().map(|p| p.len() >= 8).unwrap_or(false),
        "password",
        "password must be at least 8 characters",
    );
    v.finish()?;

    let email = body.email.unwrap();

    let db = state.db.lock().unwrap();
    if queries::barbers::get_barber_by_email(&db, &shop_id, &email)?.is_some() {
        return Err(AppError::Conflict(
            "a barber with this email already exists in this shop".to_string(),
        ));
    }

    let now = Utc::now().naive_utc();
    let barber = Barber {
        id: Uuid::new_v4().to_string(),
        barbershop_id: shop_id,
        name: body.name.unwrap(),
        email,
        password_hash: auth::hash_password(&body.password.unwrap())?,
        active: true,
        created_at: now,
        updated_at: now,
    };
    queries::barbers::create_barber(&db, &barber)?;

    tracing::info!(barber_id = %barber.id, "barber created");
    Ok(Json(barber))
}

// GET /api/barbers/:id
pub async fn get_barber(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Barber>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    super::require_any_role(&claims, &[Role::ShopAdmin, Role::Barber, Role::Customer])?;
    let shop_id = super::require_tenant(&claims)?;

    let barber = {
        let db = state.db.lock().unwrap();
        queries::barbers::get_barber(&db, &shop_id, &id)?
    }
    .ok_or_else(|| AppError::NotFound("barber not found".to_string()))?;
    Ok(Json(barber))
}

// PUT /api/barbers/:id
#[derive(Deserialize)]
pub struct UpdateBarberRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub active: Option<bool>,
}

pub async fn update_barber(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateBarberRequest>,
) -> Result<Json<Barber>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    super::require_role(&claims, Role::ShopAdmin)?;
    let shop_id = super::require_tenant(&claims)?;

    let mut v = Validator::new();
    if let Some(name) = &body.name {
        v.check(non_empty(name), "name", "name must not be empty");
    }
    if let Some(email) = &body.email {
        v.check(valid_email(email), "email", "email is invalid");
    }
    v.finish()?;

    let db = state.db.lock().unwrap();
    let mut barber = queries::barbers::get_barber(&db, &shop_id, &id)?
        .ok_or_else(|| AppError::NotFound("barber not found".to_string()))?;

    if let Some(email) = &body.email {
        if let Some(other) = queries::barbers::get_barber_by_email(&db, &shop_id, email)? {
            if other.id != barber.id {
                return Err(AppError::Conflict(
                    "a barber with this email already exists in this shop".to_string(),
                ));
            }
        }
    }

    if let Some(name) = body.name {
        barber.name = name;
    }
    if let Some(email) = body.email {
        barber.email = email;
    }
    if let Some(active) = body.active {
        barber.active = active;
    }
    barber.updated_at = Utc::now().naive_utc();

    queries::barbers::update_barber(&db, &barber)?;
    Ok(Json(barber))
}

// DELETE /api/barbers/:id
pub async fn delete_barber(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    super::require_role(&claims, Role::ShopAdmin)?;
    let shop_id = super::require_tenant(&claims)?;

    let deleted = {
        let db = state.db.lock().unwrap();
        queries::barbers::delete_barber(&db, &shop_id, &id)?
    };
    if !deleted {
        return Err(AppError::NotFound("barber not found".to_string()));
    }
    Ok(Json(serde_json::json!({ "ok": true })))
}
