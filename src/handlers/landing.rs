use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use base64::Engine;
use chrono::Utc;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::LandingPage;
use crate::services::auth::Role;
use crate::services::validation::{non_empty, Validator};
use crate::state::AppState;

/// Uploaded logos are stored inline in the database; keep them small.
const MAX_LOGO_BYTES: usize = 1024 * 1024;

fn load_landing(
    db: &rusqlite::Connection,
    shop_id: &str,
) -> Result<LandingPage, AppError> {
    queries::landing::get_landing(db, shop_id)?
        .ok_or_else(|| AppError::NotFound("landing page not found".to_string()))
}

// GET /api/landing
pub async fn get_landing(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<LandingPage>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    super::require_role(&claims, Role::ShopAdmin)?;
    let shop_id = super::require_tenant(&claims)?;

    let page = {
        let db = state.db.lock().unwrap();
        load_landing(&db, &shop_id)?
    };
    Ok(Json(page))
}

// PUT /api/landing
#[derive(Deserialize)]
pub struct UpdateLandingRequest {
    pub title: Option<String>,
    pub about: Option<String>,
    pub theme_color: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
}

fn valid_theme_color(s: &str) -> bool {
    s.len() == 7
        && s.starts_with('#')
        && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

pub async fn update_landing(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<UpdateLandingRequest>,
) -> Result<Json<LandingPage>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    super::require_role(&claims, Role::ShopAdmin)?;
    let shop_id = super::require_tenant(&claims)?;

    let mut v = Validator::new();
    if let Some(color) = &body.theme_color {
        v.check(
            valid_theme_color(color),
            "theme_color",
            "theme_color must look like '#1f2937'",
        );
    }
    v.finish()?;

    let db = state.db.lock().unwrap();
    let mut page = load_landing(&db, &shop_id)?;

    if let Some(title) = body.title {
        page.title = title;
    }
    if let Some(about) = body.about {
        page.about = about;
    }
    if let Some(color) = body.theme_color {
        page.theme_color = color;
    }
    if let Some(phone) = body.contact_phone {
        page.contact_phone = phone;
    }
    if let Some(email) = body.contact_email {
        page.contact_email = email;
    }
    page.updated_at = Utc::now().naive_utc();

    queries::landing::update_landing(&db, &page)?;
    Ok(Json(page))
}

// POST /api/landing/publish
pub async fn publish_landing(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<LandingPage>, AppError> {
    set_published(state, headers, true).await
}

// POST /api/landing/unpublish
pub async fn unpublish_landing(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<LandingPage>, AppError> {
    set_published(state, headers, false).await
}

async fn set_published(
    state: Arc<AppState>,
    headers: HeaderMap,
    published: bool,
) -> Result<Json<LandingPage>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    super::require_role(&claims, Role::ShopAdmin)?;
    let shop_id = super::require_tenant(&claims)?;

    let db = state.db.lock().unwrap();
    load_landing(&db, &shop_id)?;

    let now = Utc::now().naive_utc();
    queries::landing::set_published(&db, &shop_id, published, &now)?;
    let page = load_landing(&db, &shop_id)?;

    tracing::info!(shop_id = %shop_id, published, "landing page publish state changed");
    Ok(Json(page))
}

// POST /api/landing/logo
#[derive(Deserialize)]
pub struct UploadLogoRequest {
    pub content_type: Option<String>,
    /// Base64-encoded image bytes.
    pub data: Option<String>,
}

pub async fn upload_logo(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<UploadLogoRequest>,
) -> Result<Json<LandingPage>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    super::require_role(&claims, Role::ShopAdmin)?;
    let shop_id = super::require_tenant(&claims)?;

    let mut v = Validator::new();
    v.check(
        body.content_type
            .as_deref()
            .map(|ct| ct.starts_with("image/"))
            .unwrap_or(false),
        "content_type",
        "content_type must be an image type",
    );
    v.check(
        body.data.as_deref().map(non_empty).unwrap_or(false),
        "data",
        "data is required",
    );
    v.finish()?;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(body.data.unwrap())
        .map_err(|_| AppError::validation("data", "data is not valid base64"))?;

    if bytes.len() > MAX_LOGO_BYTES {
        return Err(AppError::validation("data", "logo must be 1 MiB or smaller"));
    }

    let db = state.db.lock().unwrap();
    load_landing(&db, &shop_id)?;

    let now = Utc::now().naive_utc();
    queries::landing::set_logo(&db, &shop_id, &bytes, body.content_type.as_deref().unwrap(), &now)?;
    let page = load_landing(&db, &shop_id)?;

    Ok(Json(page))
}
