use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use super::{fmt_dt, parse_dt, parse_opt_dt};
use crate::models::{Appointment, AppointmentStatus};

const APPOINTMENT_COLS: &str = "id, barbershop_id, barber_id, customer_id, start_time, end_time, \
     status, notes, created_at, confirmed_at, cancelled_at, completed_at";

/// Callers run this inside a transaction together with the conflict check.
pub fn create_appointment(conn: &Connection, appt: &Appointment) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO appointments (id, barbershop_id, barber_id, customer_id, start_time, end_time, status, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            appt.id,
            appt.barbershop_id,
            appt.barber_id,
            appt.customer_id,
            fmt_dt(&appt.start_time),
            fmt_dt(&appt.end_time),
            appt.status.as_str(),
            appt.notes,
            fmt_dt(&appt.created_at),
        ],
    )?;
    insert_service_links(conn, &appt.id, &appt.service_ids)?;
    Ok(())
}

pub fn get_appointment(
    conn: &Connection,
    barbershop_id: &str,
    id: &str,
) -> anyhow::Result<Option<Appointment>> {
    let sql =
        format!("SELECT {APPOINTMENT_COLS} FROM appointments WHERE barbershop_id = ?1 AND id = ?2");
    let result = conn.query_row(&sql, params![barbershop_id, id], parse_appointment_row);

    match result {
        Ok(mut appt) => {
            appt.service_ids = get_service_ids(conn, &appt.id)?;
            Ok(Some(appt))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Default)]
pub struct AppointmentFilter {
    pub barber_id: Option<String>,
    pub customer_id: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

pub fn list_appointments(
    conn: &Connection,
    barbershop_id: &str,
    filter: &AppointmentFilter,
) -> anyhow::Result<Vec<Appointment>> {
    let mut sql = format!("SELECT {APPOINTMENT_COLS} FROM appointments WHERE barbershop_id = ?1");
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> =
        vec![Box::new(barbershop_id.to_string())];

    if let Some(barber_id) = &filter.barber_id {
        params_vec.push(Box::new(barber_id.clone()));
        sql.push_str(&format!(" AND barber_id = ?{}", params_vec.len()));
    }
    if let Some(customer_id) = &filter.customer_id {
        params_vec.push(Box::new(customer_id.clone()));
        sql.push_str(&format!(" AND customer_id = ?{}", params_vec.len()));
    }
    if let Some(status) = &filter.status {
        params_vec.push(Box::new(status.as_str().to_string()));
        sql.push_str(&format!(" AND status = ?{}", params_vec.len()));
    }
    if let Some(from) = &filter.from {
        params_vec.push(Box::new(fmt_dt(from)));
        sql.push_str(&format!(" AND start_time >= ?{}", params_vec.len()));
    }
    if let Some(to) = &filter.to {
        params_vec.push(Box::new(fmt_dt(to)));
        sql.push_str(&format!(" AND start_time <= ?{}", params_vec.len()));
    }
    sql.push_str(" ORDER BY start_time ASC");

    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_refs.as_slice(), parse_appointment_row)?;

    let mut appointments = vec![];
    for row in rows {
        appointments.push(row?);
    }
    for appt in &mut appointments {
        appt.service_ids = get_service_ids(conn, &appt.id)?;
    }
    Ok(appointments)
}

/// Half-open interval overlap against the barber's non-cancelled
/// appointments. `exclude_id` carves out the appointment being rescheduled.
pub fn has_conflict(
    conn: &Connection,
    barber_id: &str,
    start: &NaiveDateTime,
    end: &NaiveDateTime,
    exclude_id: Option<&str>,
) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM appointments
         WHERE barber_id = ?1
           AND status != 'cancelled'
           AND start_time < ?3
           AND end_time > ?2
           AND (?4 IS NULL OR id != ?4)",
        params![barber_id, fmt_dt(start), fmt_dt(end), exclude_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Rewrite the mutable booking fields (barber, window, notes, services).
/// Status is never touched here; `set_status` owns transitions.
pub fn update_appointment(conn: &Connection, appt: &Appointment) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE appointments SET barber_id = ?1, start_time = ?2, end_time = ?3, notes = ?4
         WHERE barbershop_id = ?5 AND id = ?6",
        params![
            appt.barber_id,
            fmt_dt(&appt.start_time),
            fmt_dt(&appt.end_time),
            appt.notes,
            appt.barbershop_id,
            appt.id,
        ],
    )?;
    if count > 0 {
        conn.execute(
            "DELETE FROM appointment_services WHERE appointment_id = ?1",
            params![appt.id],
        )?;
        insert_service_links(conn, &appt.id, &appt.service_ids)?;
    }
    Ok(count > 0)
}

/// Apply a status transition, stamping the matching timestamp column.
/// Precondition checks (current status, legality) happen in the handler
/// before this runs; this is the write half only.
pub fn set_status(
    conn: &Connection,
    barbershop_id: &str,
    id: &str,
    next: AppointmentStatus,
    at: &NaiveDateTime,
) -> anyhow::Result<bool> {
    let stamp_col = match next {
        AppointmentStatus::Confirmed => "confirmed_at",
        AppointmentStatus::Cancelled => "cancelled_at",
        AppointmentStatus::Completed => "completed_at",
        AppointmentStatus::Pending => return Ok(false),
    };
    let sql = format!(
        "UPDATE appointments SET status = ?1, {stamp_col} = ?2
         WHERE barbershop_id = ?3 AND id = ?4"
    );
    let count = conn.execute(
        &sql,
        params![next.as_str(), fmt_dt(at), barbershop_id, id],
    )?;
    Ok(count > 0)
}

/// Occupied [start, end) windows for a barber intersecting the given range.
/// Cancelled rows do not occupy time.
pub fn get_busy_intervals(
    conn: &Connection,
    barber_id: &str,
    start: &NaiveDateTime,
    end: &NaiveDateTime,
) -> anyhow::Result<Vec<(NaiveDateTime, NaiveDateTime)>> {
    let mut stmt = conn.prepare(
        "SELECT start_time, end_time FROM appointments
         WHERE barber_id = ?1 AND status != 'cancelled'
           AND start_time < ?3 AND end_time > ?2
         ORDER BY start_time ASC",
    )?;
    let rows = stmt.query_map(params![barber_id, fmt_dt(start), fmt_dt(end)], |row| {
        let s: String = row.get(0)?;
        let e: String = row.get(1)?;
        Ok((parse_dt(&s), parse_dt(&e)))
    })?;

    let mut intervals = vec![];
    for row in rows {
        intervals.push(row?);
    }
    Ok(intervals)
}

pub fn get_service_ids(conn: &Connection, appointment_id: &str) -> anyhow::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT service_id FROM appointment_services WHERE appointment_id = ?1 ORDER BY service_id",
    )?;
    let rows = stmt.query_map(params![appointment_id], |row| row.get::<_, String>(0))?;

    let mut ids = vec![];
    for row in rows {
        ids.push(row?);
    }
    Ok(ids)
}

fn insert_service_links(
    conn: &Connection,
    appointment_id: &str,
    service_ids: &[String],
) -> anyhow::Result<()> {
    for service_id in service_ids {
        conn.execute(
            "INSERT INTO appointment_services (appointment_id, service_id) VALUES (?1, ?2)",
            params![appointment_id, service_id],
        )?;
    }
    Ok(())
}

fn parse_appointment_row(row: &rusqlite::Row) -> rusqlite::Result<Appointment> {
    let start_str: String = row.get(4)?;
    let end_str: String = row.get(5)?;
    let status_str: String = row.get(6)?;
    let created_str: String = row.get(8)?;
    Ok(Appointment {
        id: row.get(0)?,
        barbershop_id: row.get(1)?,
        barber_id: row.get(2)?,
        customer_id: row.get(3)?,
        service_ids: vec![],
        start_time: parse_dt(&start_str),
        end_time: parse_dt(&end_str),
        status: AppointmentStatus::parse(&status_str),
        notes: row.get(7)?,
        created_at: parse_dt(&created_str),
        confirmed_at: parse_opt_dt(row.get(9)?),
        cancelled_at: parse_opt_dt(row.get(10)?),
        completed_at: parse_opt_dt(row.get(11)?),
    })
}
