use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Barbershop, ShopAdmin};
use crate::services::auth::{self, Role};
use crate::services::validation::{non_empty, valid_email, valid_slug, Validator};
use crate::state::AppState;

// GET /api/barbershops
pub async fn list_barbershops(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Barbershop>>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    super::require_role(&claims, Role::Admin)?;

    let shops = {
        let db = state.db.lock().unwrap();
        queries::barbershops::list_barbershops(&db)?
    };
    Ok(Json(shops))
}

// POST /api/barbershops
#[derive(Deserialize)]
pub struct CreateBarbershopRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub admin_name: Option<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

pub async fn create_barbershop(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateBarbershopRequest>,
) -> Result<Json<Barbershop>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    super::require_role(&claims, Role::Admin)?;

    let mut v = Validator::new();
    v.check(
        body.name.as_deref().map(non_empty).unwrap_or(false),
        "name",
        "name is required",
    );
    v.check(
        body.slug.as_deref().map(valid_slug).unwrap_or(false),
        "slug",
        "slug must be lowercase letters, digits and hyphens",
    );
    v.check(
        body.admin_name.as_deref().map(non_empty).unwrap_or(false),
        "admin_name",
        "admin name is required",
    );
    v.check(
        body.admin_email.as_deref().map(valid_email).unwrap_or(false),
        "admin_email",
        "a valid admin email is required",
    );
    v.check(
        body.admin_password
            .as_deref()
            .map(|p| p.len() >= 8)
            .unwrap_or(false),
        "admin_password",
        "admin password must be at least 8 characters",
    );
    v.finish()?;

    let slug = body.slug.unwrap();
    let admin_email = body.admin_email.unwrap();

    let mut db = state.db.lock().unwrap();

    if queries::barbershops::get_barbershop_by_slug(&db, &slug)?.is_some() {
        return Err(AppError::Conflict(format!("slug '{slug}' is already taken")));
    }
    if queries::accounts::get_shop_admin_by_email(&db, &admin_email)?.is_some() {
        return Err(AppError::Conflict(
            "a shop admin with this email already exists".to_string(),
        ));
    }

    let now = Utc::now().naive_utc();
    let shop = Barbershop {
        id: Uuid::new_v4().to_string(),
        name: body.name.unwrap(),
        slug,
        phone: body.phone,
        address: body.address,
        created_at: now,
        updated_at: now,
    };
    let admin = ShopAdmin {
        id: Uuid::new_v4().to_string(),
        barbershop_id: shop.id.clone(),
        email: admin_email,
        name: body.admin_name.unwrap(),
        password_hash: auth::hash_password(&body.admin_password.unwrap())?,
    };

    // Shop, its first admin and the landing row are provisioned together.
    let tx = db.transaction()?;
    queries::barbershops::create_barbershop(&tx, &shop)?;
    queries::accounts::create_shop_admin(&tx, &admin)?;
    queries::landing::create_default(&tx, &shop.id, &now)?;
    tx.commit()?;

    tracing::info!(shop_id = %shop.id, slug = %shop.slug, "barbershop created");
    Ok(Json(shop))
}

// GET /api/barbershops/:id
pub async fn get_barbershop(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Barbershop>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    super::require_role(&claims, Role::Admin)?;

    let shop = {
        let db = state.db.lock().unwrap();
        queries::barbershops::get_barbershop(&db, &id)?
    }
    .ok_or_else(|| AppError::NotFound("barbershop not found".to_string()))?;
    Ok(Json(shop))
}

// PUT /api/barbershops/:id
#[derive(Deserialize)]
pub struct UpdateBarbershopRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

pub async fn update_barbershop(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateBarbershopRequest>,
) -> Result<Json<Barbershop>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    super::require_role(&claims, Role::Admin)?;

    let mut v = Validator::new();
    if let Some(name) = &body.name {
        v.check(non_empty(name), "name", "name must not be empty");
    }
    if let Some(slug) = &body.slug {
        v.check(
            valid_slug(slug),
            "slug",
            "slug must be lowercase letters, digits and hyphens",
        );
    }
    v.finish()?;

    let db = state.db.lock().unwrap();
    let mut shop = queries::barbershops::get_barbershop(&db, &id)?
        .ok_or_else(|| AppError::NotFound("barbershop not found".to_string()))?;

    if let Some(slug) = &body.slug {
        if let Some(other) = queries::barbershops::get_barbershop_by_slug(&db, slug)? {
            if other.id != shop.id {
                return Err(AppError::Conflict(format!("slug '{slug}' is already taken")));
            }
        }
    }

    if let Some(name) = body.name {
        shop.name = name;
    }
    if let Some(slug) = body.slug {
        shop.slug = slug;
    }
    if let Some(phone) = body.phone {
        shop.phone = Some(phone);
    }
    if let Some(address) = body.address {
        shop.address = Some(address);
    }
    shop.updated_at = Utc::now().naive_utc();

    queries::barbershops::update_barbershop(&db, &shop)?;
    Ok(Json(shop))
}

// DELETE /api/barbershops/:id
pub async fn delete_barbershop(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    super::require_role(&claims, Role::Admin)?;

    let deleted = {
        let db = state.db.lock().unwrap();
        queries::barbershops::delete_barbershop(&db, &id)?
    };
    if !deleted {
        return Err(AppError::NotFound("barbershop not found".to_string()));
    }

    tracing::info!(shop_id = %id, "barbershop deleted");
    Ok(Json(serde_json::json!({ "ok": true })))
}
