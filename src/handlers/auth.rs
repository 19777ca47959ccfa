use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Customer;
use crate::services::auth::{self, Role};
use crate::services::validation::{non_empty, valid_email, Validator};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barbershop_id: Option<String>,
}

fn validate_credentials(email: &Option<String>, password: &Option<String>) -> Result<(), AppError> {
    let mut v = Validator::new();
    v.check(
        email.as_deref().map(valid_email).unwrap_or(false),
        "email",
        "a valid email is required",
    );
    v.check(
        password.as_deref().map(non_empty).unwrap_or(false),
        "password",
        "password is required",
    );
    v.finish()
}

// POST /api/auth/admin/login
pub async fn admin_login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_credentials(&body.email, &body.password)?;
    let email = body.email.unwrap();
    let password = body.password.unwrap();

    let admin = {
        let db = state.db.lock().unwrap();
        queries::accounts::get_admin_by_email(&db, &email)?
    }
    .ok_or(AppError::Unauthorized)?;

    if !auth::verify_password(&password, &admin.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    let token = auth::issue_token(&admin.id, Role::Admin, None, &admin.email, &state.config)?;
    Ok(Json(LoginResponse {
        token,
        role: Role::Admin.as_str(),
        barbershop_id: None,
    }))
}

// POST /api/auth/shop/login
pub async fn shop_login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_credentials(&body.email, &body.password)?;
    let email = body.email.unwrap();
    let password = body.password.unwrap();

    let admin = {
        let db = state.db.lock().unwrap();
        queries::accounts::get_shop_admin_by_email(&db, &email)?
    }
    .ok_or(AppError::Unauthorized)?;

    if !auth::verify_password(&password, &admin.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    let token = auth::issue_token(
        &admin.id,
        Role::ShopAdmin,
        Some(&admin.barbershop_id),
        &admin.email,
        &state.config,
    )?;
    Ok(Json(LoginResponse {
        token,
        role: Role::ShopAdmin.as_str(),
        barbershop_id: Some(admin.barbershop_id),
    }))
}

// POST /api/auth/barber/login
#[derive(Serialize)]
pub struct BarberMembership {
    pub barber_id: String,
    pub barbershop_id: String,
    pub barbershop_name: String,
}

#[derive(Serialize)]
pub struct BarberLoginResponse {
    pub token: String,
    pub role: &'static str,
    pub barbershop_id: String,
    /// Every shop this email works at; clients offer a context switch when
    /// there is more than one.
    pub memberships: Vec<BarberMembership>,
}

pub async fn barber_login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<BarberLoginResponse>, AppError> {
    validate_credentials(&body.email, &body.password)?;
    let email = body.email.unwrap();
    let password = body.password.unwrap();

    let db = state.db.lock().unwrap();
    let rows = queries::barbers::get_barbers_by_email(&db, &email)?;

    // Rows are per-shop accounts; credentials may differ between shops, so
    // verify against each until one matches.
    let mut matched = None;
    for barber in &rows {
        if auth::verify_password(&password, &barber.password_hash)? {
            matched = Some(barber.clone());
            break;
        }
    }
    let barber = matched.ok_or(AppError::Unauthorized)?;

    let mut memberships = vec![];
    for row in &rows {
        let shop = queries::barbershops::get_barbershop(&db, &row.barbershop_id)?;
        if let Some(shop) = shop {
            memberships.push(BarberMembership {
                barber_id: row.id.clone(),
                barbershop_id: shop.id,
                barbershop_name: shop.name,
            });
        }
    }

    let token = auth::issue_token(
        &barber.id,
        Role::Barber,
        Some(&barber.barbershop_id),
        &barber.email,
        &state.config,
    )?;
    Ok(Json(BarberLoginResponse {
        token,
        role: Role::Barber.as_str(),
        barbershop_id: barber.barbershop_id,
        memberships,
    }))
}

// POST /api/auth/barber/switch
#[derive(Deserialize)]
pub struct SwitchRequest {
    pub barbershop_id: Option<String>,
}

pub async fn barber_switch(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<SwitchRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    super::require_role(&claims, Role::Barber)?;

    let mut v = Validator::new();
    v.check(
        body.barbershop_id.as_deref().map(non_empty).unwrap_or(false),
        "barbershop_id",
        "barbershop_id is required",
    );
    v.finish()?;
    let target_shop = body.barbershop_id.unwrap();

    // The switch target must hold a barber account with the same email; the
    // original credential check carries over.
    let barber = {
        let db = state.db.lock().unwrap();
        queries::barbers::get_barber_by_email(&db, &target_shop, &claims.email)?
    }
    .ok_or(AppError::Forbidden)?;

    let token = auth::issue_token(
        &barber.id,
        Role::Barber,
        Some(&barber.barbershop_id),
        &barber.email,
        &state.config,
    )?;
    Ok(Json(LoginResponse {
        token,
        role: Role::Barber.as_str(),
        barbershop_id: Some(barber.barbershop_id),
    }))
}

// POST /api/auth/customer/login
#[derive(Deserialize)]
pub struct CustomerLoginRequest {
    pub slug: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

pub async fn customer_login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CustomerLoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let mut v = Validator::new();
    v.check(
        body.slug.as_deref().map(non_empty).unwrap_or(false),
        "slug",
        "barbershop slug is required",
    );
    v.finish()?;
    validate_credentials(&body.email, &body.password)?;

    let slug = body.slug.unwrap();
    let email = body.email.unwrap();
    let password = body.password.unwrap();

    let db = state.db.lock().unwrap();
    let shop = queries::barbershops::get_barbershop_by_slug(&db, &slug)?
        .ok_or_else(|| AppError::NotFound("barbershop not found".to_string()))?;

    let customer = queries::customers::get_customer_by_email(&db, &shop.id, &email)?
        .ok_or(AppError::Unauthorized)?;

    if !auth::verify_password(&password, &customer.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    let token = auth::issue_token(
        &customer.id,
        Role::Customer,
        Some(&shop.id),
        &customer.email,
        &state.config,
    )?;
    Ok(Json(LoginResponse {
        token,
        role: Role::Customer.as_str(),
        barbershop_id: Some(shop.id),
    }))
}

// POST /api/auth/customer/register
#[derive(Deserialize)]
pub struct CustomerRegisterRequest {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

pub async fn customer_register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CustomerRegisterRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let mut v = Validator::new();
    v.check(
        body.slug.as_deref().map(non_empty).unwrap_or(false),
        "slug",
        "barbershop slug is required",
    );
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

    let slug = body.slug.unwrap();
    let email = body.email.unwrap();

    let db = state.db.lock().unwrap();
    let shop = queries::barbershops::get_barbershop_by_slug(&db, &slug)?
        .ok_or_else(|| AppError::NotFound("barbershop not found".to_string()))?;

    if queries::customers::get_customer_by_email(&db, &shop.id, &email)?.is_some() {
        return Err(AppError::Conflict(
            "an account with this email already exists".to_string(),
        ));
    }

    let now = Utc::now().naive_utc();
    let customer = Customer {
        id: Uuid::new_v4().to_string(),
        barbershop_id: shop.id.clone(),
        name: body.name.unwrap(),
        email,
        phone: body.phone,
        password_hash: auth::hash_password(&body.password.unwrap())?,
        created_at: now,
        updated_at: now,
    };
    queries::customers::create_customer(&db, &customer)?;

    tracing::info!(customer_id = %customer.id, shop = %shop.slug, "customer registered");

    let token = auth::issue_token(
        &customer.id,
        Role::Customer,
        Some(&shop.id),
        &customer.email,
        &state.config,
    )?;
    Ok(Json(LoginResponse {
        token,
        role: Role::Customer.as_str(),
        barbershop_id: Some(shop.id),
    }))
}
