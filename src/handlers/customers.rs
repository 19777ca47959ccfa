use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Customer;
use crate::services::auth::{self, Role};
use crate::services::validation::{non_empty, valid_email, Validator};
use crate::state::AppState;

// GET /api/customers
pub async fn list_customers(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Customer>>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    super::require_role(&claims, Role::ShopAdmin)?;
    let shop_id = super::require_tenant(&claims)?;

    let customers = {
        let db = state.db.lock().unwrap();
        queries::customers::list_customers(&db, &shop_id)?
    };
    Ok(Json(customers))
}

// POST /api/customers
#[derive(Deserialize)]
pub struct CreateCustomerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

pub async fn create_customer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateCustomerRequest>,
) -> Result<Json<Customer>, AppError> {
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
    if queries::customers::get_customer_by_email(&db, &shop_id, &email)?.is_some() {
        return Err(AppError::Conflict(
            "a customer with this email already exists".to_string(),
        ));
    }

    let now = Utc::now().naive_utc();
    let customer = Customer {
        id: Uuid::new_v4().to_string(),
        barbershop_id: shop_id,
        name: body.name.unwrap(),
        email,
        phone: body.phone,
        password_hash: auth::hash_password(&body.password.unwrap())?,
        created_at: now,
        updated_at: now,
    };
    queries::customers::create_customer(&db, &customer)?;

    Ok(Json(customer))
}

// GET /api/customers/:id
pub async fn get_customer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Customer>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    super::require_role(&claims, Role::ShopAdmin)?;
    let shop_id = super::require_tenant(&claims)?;

    let customer = {
        let db = state.db.lock().unwrap();
        queries::customers::get_customer(&db, &shop_id, &id)?
    }
    .ok_or_else(|| AppError::NotFound("customer not found".to_string()))?;
    Ok(Json(customer))
}

// PUT /api/customers/:id
#[derive(Deserialize)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

pub async fn update_customer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateCustomerRequest>,
) -> Result<Json<Customer>, AppError> {
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
    let mut customer = queries::customers::get_customer(&db, &shop_id, &id)?
        .ok_or_else(|| AppError::NotFound("customer not found".to_string()))?;

    if let Some(email) = &body.email {
        if let Some(other) = queries::customers::get_customer_by_email(&db, &shop_id, email)? {
            if other.id != customer.id {
                return Err(AppError::Conflict(
                    "a customer with this email already exists".to_string(),
                ));
            }
        }
    }

    if let Some(name) = body.name {
        customer.name = name;
    }
    if let Some(email) = body.email {
        customer.email = email;
    }
    if let Some(phone) = body.phone {
        customer.phone = Some(phone);
    }
    customer.updated_at = Utc::now().naive_utc();

    queries::customers::update_customer(&db, &customer)?;
    Ok(Json(customer))
}

// DELETE /api/customers/:id
pub async fn delete_customer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    super::require_role(&claims, Role::ShopAdmin)?;
    let shop_id = super::require_tenant(&claims)?;

    let deleted = {
        let db = state.db.lock().unwrap();
        queries::customers::delete_customer(&db, &shop_id, &id)?
    };
    if !deleted {
        return Err(AppError::NotFound("customer not found".to_string()));
    }
    Ok(Json(serde_json::json!({ "ok": true })))
}
