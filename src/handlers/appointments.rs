use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{Duration, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::queries;
use crate::db::queries::appointments::AppointmentFilter;
use crate::errors::AppError;
use crate::models::{Appointment, AppointmentStatus, Service};
use crate::services::auth::{Claims, Role};
use crate::services::scheduling;
use crate::services::validation::{non_empty, parse_date, parse_datetime, Validator};
use crate::state::AppState;

/// Sum of service durations; the end timestamp is always derived from this.
fn total_duration(services: &[Service]) -> i32 {
    services.iter().map(|s| s.duration_minutes).sum()
}

fn parse_status_strict(s: &str) -> Result<AppointmentStatus, AppError> {
    match s {
        "pending" | "confirmed" | "completed" | "cancelled" => Ok(AppointmentStatus::parse(s)),
        _ => Err(AppError::validation("status", "unknown status")),
    }
}

/// Resolve and validate the service list for a booking within a tenant.
fn resolve_services(
    conn: &rusqlite::Connection,
    shop_id: &str,
    ids: &[String],
) -> Result<Vec<Service>, AppError> {
    let mut unique = ids.to_vec();
    unique.sort();
    unique.dedup();

    let services = queries::services::get_services_by_ids(conn, shop_id, &unique)?;
    if services.len() != unique.len() {
        return Err(AppError::validation(
            "service_ids",
            "one or more services do not exist",
        ));
    }
    Ok(services)
}

// POST /api/appointments
#[derive(Deserialize)]
pub struct CreateAppointmentRequest {
    pub barber_id: Option<String>,
    pub service_ids: Option<Vec<String>>,
    pub start_time: Option<String>,
    pub customer_id: Option<String>,
    pub notes: Option<String>,
}

pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateAppointmentRequest>,
) -> Result<Json<Appointment>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    let role = super::require_any_role(&claims, &[Role::ShopAdmin, Role::Customer])?;
    let shop_id = super::require_tenant(&claims)?;

    let mut v = Validator::new();
    v.check(
        body.barber_id.as_deref().map(non_empty).unwrap_or(false),
        "barber_id",
        "barber_id is required",
    );
    v.check(
        body.service_ids.as_deref().map(|s| !s.is_empty()).unwrap_or(false),
        "service_ids",
        "at least one service is required",
    );
    v.check(
        body.start_time
            .as_deref()
            .and_then(parse_datetime)
            .is_some(),
        "start_time",
        "start_time must be 'YYYY-MM-DD HH:MM'",
    );
    if role == Role::ShopAdmin {
        v.check(
            body.customer_id.as_deref().map(non_empty).unwrap_or(false),
            "customer_id",
            "customer_id is required when booking on behalf of a customer",
        );
    }
    v.finish()?;

    let barber_id = body.barber_id.unwrap();
    let start = parse_datetime(body.start_time.as_deref().unwrap()).unwrap();
    // Customers only ever book for themselves.
    let customer_id = match role {
        Role::Customer => claims.sub.clone(),
        _ => body.customer_id.unwrap(),
    };

    let mut db = state.db.lock().unwrap();

    let barber = queries::barbers::get_barber(&db, &shop_id, &barber_id)?
        .ok_or_else(|| AppError::NotFound("barber not found".to_string()))?;
    if !barber.active {
        return Err(AppError::Conflict(
            "this barber is not accepting new bookings".to_string(),
        ));
    }
    queries::customers::get_customer(&db, &shop_id, &customer_id)?
        .ok_or_else(|| AppError::NotFound("customer not found".to_string()))?;

    let services = resolve_services(&db, &shop_id, body.service_ids.as_deref().unwrap())?;
    let duration = total_duration(&services);

    let now = Utc::now().naive_utc();
    let appt = Appointment {
        id: Uuid::new_v4().to_string(),
        barbershop_id: shop_id,
        barber_id: barber.id.clone(),
        customer_id,
        service_ids: services.iter().map(|s| s.id.clone()).collect(),
        start_time: start,
        end_time: start + Duration::minutes(duration as i64),
        status: AppointmentStatus::Pending,
        notes: body.notes,
        created_at: now,
        confirmed_at: None,
        cancelled_at: None,
        completed_at: None,
    };

    // Conflict check and insert share one transaction so a concurrent
    // booking cannot slip between them.
    let tx = db.transaction()?;
    scheduling::check_slot(&tx, &appt.barber_id, &appt.start_time, duration, None)?;
    queries::appointments::create_appointment(&tx, &appt)?;
    tx.commit()?;

    state.availability_cache.invalidate_barber(&appt.barber_id);

    tracing::info!(
        appointment_id = %appt.id,
        barber_id = %appt.barber_id,
        start = %appt.start_time,
        "appointment booked"
    );
    Ok(Json(appt))
}

// GET /api/appointments
#[derive(Deserialize)]
pub struct ListAppointmentsQuery {
    pub barber_id: Option<String>,
    pub customer_id: Option<String>,
    pub status: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListAppointmentsQuery>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    let role = super::require_any_role(&claims, &[Role::ShopAdmin, Role::Barber, Role::Customer])?;
    let shop_id = super::require_tenant(&claims)?;

    let mut filter = AppointmentFilter {
        barber_id: query.barber_id,
        customer_id: query.customer_id,
        ..Default::default()
    };

    // Barbers and customers only ever see their own schedule, whatever the
    // query asks for.
    match role {
        Role::Barber => filter.barber_id = Some(claims.sub.clone()),
        Role::Customer => filter.customer_id = Some(claims.sub.clone()),
        _ => {}
    }

    if let Some(status) = &query.status {
        filter.status = Some(parse_status_strict(status)?);
    }
    if let Some(from) = &query.from {
        filter.from = parse_datetime(from)
            .or_else(|| parse_date(from).and_then(|d| d.and_hms_opt(0, 0, 0)))
            .ok_or_else(|| AppError::validation("from", "from must be a date or datetime"))
            .map(Some)?;
    }
    if let Some(to) = &query.to {
        filter.to = parse_datetime(to)
            .or_else(|| parse_date(to).and_then(|d| d.and_hms_opt(23, 59, 59)))
            .ok_or_else(|| AppError::validation("to", "to must be a date or datetime"))
            .map(Some)?;
    }

    let appointments = {
        let db = state.db.lock().unwrap();
        queries::appointments::list_appointments(&db, &shop_id, &filter)?
    };
    Ok(Json(appointments))
}

fn load_scoped_appointment(
    db: &rusqlite::Connection,
    claims: &Claims,
    role: Role,
    shop_id: &str,
    id: &str,
) -> Result<Appointment, AppError> {
    let appt = queries::appointments::get_appointment(db, shop_id, id)?
        .ok_or_else(|| AppError::NotFound("appointment not found".to_string()))?;

    let allowed = match role {
        Role::ShopAdmin => true,
        Role::Barber => appt.barber_id == claims.sub,
        Role::Customer => appt.customer_id == claims.sub,
        Role::Admin => false,
    };
    if !allowed {
        return Err(AppError::Forbidden);
    }
    Ok(appt)
}

// GET /api/appointments/:id
pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Appointment>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    let role = super::require_any_role(&claims, &[Role::ShopAdmin, Role::Barber, Role::Customer])?;
    let shop_id = super::require_tenant(&claims)?;

    let appt = {
        let db = state.db.lock().unwrap();
        load_scoped_appointment(&db, &claims, role, &shop_id, &id)?
    };
    Ok(Json(appt))
}

// PUT /api/appointments/:id
#[derive(Deserialize)]
pub struct UpdateAppointmentRequest {
    pub barber_id: Option<String>,
    pub service_ids: Option<Vec<String>>,
    pub start_time: Option<String>,
    pub notes: Option<String>,
}

pub async fn update_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateAppointmentRequest>,
) -> Result<Json<Appointment>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    let role = super::require_any_role(&claims, &[Role::ShopAdmin, Role::Customer])?;
    let shop_id = super::require_tenant(&claims)?;

    let mut v = Validator::new();
    if let Some(start) = &body.start_time {
        v.check(
            parse_datetime(start).is_some(),
            "start_time",
            "start_time must be 'YYYY-MM-DD HH:MM'",
        );
    }
    if let Some(service_ids) = &body.service_ids {
        v.check(
            !service_ids.is_empty(),
            "service_ids",
            "at least one service is required",
        );
    }
    v.finish()?;

    let mut db = state.db.lock().unwrap();
    let mut appt = load_scoped_appointment(&db, &claims, role, &shop_id, &id)?;

    if matches!(
        appt.status,
        AppointmentStatus::Completed | AppointmentStatus::Cancelled
    ) {
        return Err(AppError::Conflict(format!(
            "cannot modify a {} appointment",
            appt.status.as_str()
        )));
    }

    let previous_barber = appt.barber_id.clone();

    if let Some(barber_id) = body.barber_id {
        let barber = queries::barbers::get_barber(&db, &shop_id, &barber_id)?
            .ok_or_else(|| AppError::NotFound("barber not found".to_string()))?;
        if !barber.active {
            return Err(AppError::Conflict(
                "this barber is not accepting new bookings".to_string(),
            ));
        }
        appt.barber_id = barber.id;
    }

    // Duration comes from the new service list when given, otherwise the
    // booked window is kept as-is.
    let duration = match &body.service_ids {
        Some(ids) => {
            let services = resolve_services(&db, &shop_id, ids)?;
            appt.service_ids = services.iter().map(|s| s.id.clone()).collect();
            total_duration(&services)
        }
        None => (appt.end_time - appt.start_time).num_minutes() as i32,
    };

    if let Some(start) = body.start_time {
        appt.start_time = parse_datetime(&start).unwrap();
    }
    appt.end_time = appt.start_time + Duration::minutes(duration as i64);

    if let Some(notes) = body.notes {
        appt.notes = Some(notes);
    }

    let tx = db.transaction()?;
    scheduling::check_slot(&tx, &appt.barber_id, &appt.start_time, duration, Some(&appt.id))?;
    queries::appointments::update_appointment(&tx, &appt)?;
    tx.commit()?;

    state.availability_cache.invalidate_barber(&previous_barber);
    if appt.barber_id != previous_barber {
        state.availability_cache.invalidate_barber(&appt.barber_id);
    }

    Ok(Json(appt))
}

// POST /api/appointments/:id/{confirm,cancel,complete}

async fn transition(
    state: Arc<AppState>,
    headers: HeaderMap,
    id: String,
    next: AppointmentStatus,
) -> Result<Json<Appointment>, AppError> {
    let claims = super::authenticate(&headers, &state.config)?;
    let role = super::require_any_role(&claims, &[Role::ShopAdmin, Role::Barber, Role::Customer])?;
    let shop_id = super::require_tenant(&claims)?;

    let db = state.db.lock().unwrap();
    let appt = load_scoped_appointment(&db, &claims, role, &shop_id, &id)?;

    // Customers may cancel their own booking and nothing else; confirm and
    // complete belong to the shop side.
    if role == Role::Customer && next != AppointmentStatus::Cancelled {
        return Err(AppError::Forbidden);
    }

    if !appt.status.can_transition_to(next) {
        return Err(AppError::Conflict(format!(
            "cannot move a {} appointment to {}",
            appt.status.as_str(),
            next.as_str()
        )));
    }

    let now = Utc::now().naive_utc();
    queries::appointments::set_status(&db, &shop_id, &appt.id, next, &now)?;
    let updated = queries::appointments::get_appointment(&db, &shop_id, &appt.id)?
        .ok_or_else(|| AppError::NotFound("appointment not found".to_string()))?;
    drop(db);

    state.availability_cache.invalidate_barber(&updated.barber_id);

    tracing::info!(
        appointment_id = %updated.id,
        status = updated.status.as_str(),
        "appointment status changed"
    );
    Ok(Json(updated))
}

pub async fn confirm_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Appointment>, AppError> {
    transition(state, headers, id, AppointmentStatus::Confirmed).await
}

pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Appointment>, AppError> {
    transition(state, headers, id, AppointmentStatus::Cancelled).await
}

pub async fn complete_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Appointment>, AppError> {
    transition(state, headers, id, AppointmentStatus::Completed).await
}
