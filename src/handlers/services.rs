use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Service;
use crate::services::auth::Role;
use crate::services::validation::{non_empty, Validator};
use crate::state::AppState;

// GET /api/services
pub async fn list_services(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Service>>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    super::require_any_role(&claims, &[Role::ShopAdmin, Role::Barber, Role::Customer])?;
    let shop_id = super::require_tenant(&claims)?;

    let services = {
        let db = state.db.lock().unwrap();
        queries::services::list_services(&db, &shop_id)?
    };
    Ok(Json(services))
}

// POST /api/services
#[derive(Deserialize)]
pub struct CreateServiceRequest {
    pub name: Option<String>,
    pub duration_minutes: Option<i32>,
    pub price_cents: Option<i64>,
}

pub async fn create_service(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateServiceRequest>,
) -> Result<Json<Service>, AppError> {
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
        body.duration_minutes.map(|d| d > 0).unwrap_or(false),
        "duration_minutes",
        "duration must be a positive number of minutes",
    );
    v.check(
        body.price_cents.map(|p| p >= 0).unwrap_or(false),
        "price_cents",
        "price must be zero or more",
    );
    v.finish()?;

    let name = body.name.unwrap();

    let db = state.db.lock().unwrap();
    if queries::services::get_service_by_name(&db, &shop_id, &name)?.is_some() {
        return Err(AppError::Conflict(format!(
            "a service named '{name}' already exists"
        )));
    }

    let now = Utc::now().naive_utc();
    let service = Service {
        id: Uuid::new_v4().to_string(),
        barbershop_id: shop_id,
        name,
        duration_minutes: body.duration_minutes.unwrap(),
        price_cents: body.price_cents.unwrap(),
        created_at: now,
        updated_at: now,
    };
    queries::services::create_service(&db, &service)?;

    Ok(Json(service))
}

// GET /api/services/:id
pub async fn get_service(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Service>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    super::require_any_role(&claims, &[Role::ShopAdmin, Role::Barber, Role::Customer])?;
    let shop_id = super::require_tenant(&claims)?;

    let service = {
        let db = state.db.lock().unwrap();
        queries::services::get_service(&db, &shop_id, &id)?
    }
    .ok_or_else(|| AppError::NotFound("service not found".to_string()))?;
    Ok(Json(service))
}

// PUT /api/services/:id
#[derive(Deserialize)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub duration_minutes: Option<i32>,
    pub price_cents: Option<i64>,
}

pub async fn update_service(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateServiceRequest>,
) -> Result<Json<Service>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    super::require_role(&claims, Role::ShopAdmin)?;
    let shop_id = super::require_tenant(&claims)?;

    let mut v = Validator::new();
    if let Some(name) = &body.name {
        v.check(non_empty(name), "name", "name must not be empty");
    }
    if let Some(duration) = body.duration_minutes {
        v.check(
            duration > 0,
            "duration_minutes",
            "duration must be a positive number of minutes",
        );
    }
    if let Some(price) = body.price_cents {
        v.check(price >= 0, "price_cents", "price must be zero or more");
    }
    v.finish()?;

    let db = state.db.lock().unwrap();
    let mut service = queries::services::get_service(&db, &shop_id, &id)?
        .ok_or_else(|| AppError::NotFound("service not found".to_string()))?;

    if let Some(name) = &body.name {
        if let Some(other) = queries::services::get_service_by_name(&db, &shop_id, name)? {
            if other.id != service.id {
                return Err(AppError::Conflict(format!(
                    "a service named '{name}' already exists"
                )));
            }
        }
    }

    if let Some(name) = body.name {
        service.name = name;
    }
    if let Some(duration) = body.duration_minutes {
        service.duration_minutes = duration;
    }
    if let Some(price) = body.price_cents {
        service.price_cents = price;
    }
    service.updated_at = Utc::now().naive_utc();

    queries::services::update_service(&db, &service)?;
    Ok(Json(service))
}

// DELETE /api/services/:id
pub async fn delete_service(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    super::require_role(&claims, Role::ShopAdmin)?;
    let shop_id = super::require_tenant(&claims)?;

    let deleted = {
        let db = state.db.lock().unwrap();
        queries::services::delete_service(&db, &shop_id, &id)?
    };
    if !deleted {
        return Err(AppError::NotFound("service not found".to_string()));
    }
    Ok(Json(serde_json::json!({ "ok": true })))
}
