//! JWT issuance/verification and password hashing for the four principal
//! roles. Tokens are HS256 over the configured secret; passwords are
//! Argon2id PHC strings.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    ShopAdmin,
    Barber,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::ShopAdmin => "shop_admin",
            Role::Barber => "barber",
            Role::Customer => "customer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "shop_admin" => Some(Role::ShopAdmin),
            "barber" => Some(Role::Barber),
            "customer" => Some(Role::Customer),
            _ => None,
        }
    }
}

/// Claims embedded in every access token. `barbershop_id` is absent only
/// for the central admin; every tenant-scoped principal carries it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub barbershop_id: Option<String>,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

pub fn issue_token(
    subject: &str,
    role: Role,
    barbershop_id: Option<&str>,
    email: &str,
    config: &AppConfig,
) -> anyhow::Result<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: subject.to_string(),
        role: role.as_str().to_string(),
        barbershop_id: barbershop_id.map(|s| s.to_string()),
        email: email.to_string(),
        iat: now,
        exp: now + config.token_ttl_minutes * 60,
    };

    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key)?;
    Ok(token)
}

/// Verify signature and expiry; `None` means the bearer is not authenticated
/// (the caller turns that into a 401, without detail leakage).
pub fn decode_token(token: &str, config: &AppConfig) -> Option<Claims> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["sub", "exp", "iat"]);

    jsonwebtoken::decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .ok()
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;
    Ok(hash.to_string())
}

/// `Ok(false)` on mismatch; `Err` only for a malformed stored hash.
pub fn verify_password(password: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("invalid password hash: {e}"))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("password verify failed: {e}")),
    }
}
