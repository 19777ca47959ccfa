use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::services::auth::Role;
use crate::services::availability::{self, AvailabilityCache, DayAvailability};
use crate::services::validation::{non_empty, parse_date, Validator};
use crate::state::AppState;

/// Longest range a single request may enumerate.
const MAX_RANGE_DAYS: i64 = 31;

// GET /api/availability
#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub barber_id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    /// Comma-separated service ids; duration is their sum.
    pub service_ids: Option<String>,
}

pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<DayAvailability>>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    super::require_any_role(&claims, &[Role::ShopAdmin, Role::Barber, Role::Customer])?;
    let shop_id = super::require_tenant(&claims)?;

    let mut v = Validator::new();
    v.check(
        query.barber_id.as_deref().map(non_empty).unwrap_or(false),
        "barber_id",
        "barber_id is required",
    );
    v.check(
        query.from.as_deref().and_then(parse_date).is_some(),
        "from",
        "from must be 'YYYY-MM-DD'",
    );
    v.check(
        query.to.as_deref().and_then(parse_date).is_some(),
        "to",
        "to must be 'YYYY-MM-DD'",
    );
    v.check(
        query
            .service_ids
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false),
        "service_ids",
        "at least one service id is required",
    );
    v.finish()?;

    let barber_id = query.barber_id.unwrap();
    let from = parse_date(query.from.as_deref().unwrap()).unwrap();
    let to = parse_date(query.to.as_deref().unwrap()).unwrap();

    if to < from {
        return Err(AppError::validation("to", "to must not be before from"));
    }
    if (to - from).num_days() >= MAX_RANGE_DAYS {
        return Err(AppError::validation(
            "to",
            "date range is limited to 31 days",
        ));
    }

    let service_ids: Vec<String> = query
        .service_ids
        .unwrap()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let db = state.db.lock().unwrap();

    let barber = queries::barbers::get_barber(&db, &shop_id, &barber_id)?
        .ok_or_else(|| AppError::NotFound("barber not found".to_string()))?;

    let mut unique = service_ids.clone();
    unique.sort();
    unique.dedup();
    let services = queries::services::get_services_by_ids(&db, &shop_id, &unique)?;
    if services.len() != unique.len() {
        return Err(AppError::validation(
            "service_ids",
            "one or more services do not exist",
        ));
    }
    let duration: i32 = services.iter().map(|s| s.duration_minutes).sum();

    // An inactive barber takes no new bookings: every day reads as full.
    if !barber.active {
        let mut days = vec![];
        let mut day = from;
        while day <= to {
            days.push(DayAvailability {
                date: day.format("%Y-%m-%d").to_string(),
                slots: vec![],
            });
            day = match day.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }
        return Ok(Json(days));
    }

    let key = AvailabilityCache::key(&barber.id, from, to, duration);
    if let Some(days) = state.availability_cache.get(&key) {
        return Ok(Json(days));
    }

    let days = availability::enumerate(&db, &barber.id, from, to, duration)?;
    state.availability_cache.insert(key, days.clone());

    Ok(Json(days))
}
