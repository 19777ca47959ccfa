use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Tenant root. Every other aggregate hangs off a barbershop id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Barbershop {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Central (cross-tenant) administrator account.
#[derive(Debug, Clone)]
pub struct Admin {
    pub id: String,
    pub email: String,
    pub password_hash: String,
}

/// Per-barbershop administrator account.
#[derive(Debug, Clone)]
pub struct ShopAdmin {
    pub id: String,
    pub barbershop_id: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
}
