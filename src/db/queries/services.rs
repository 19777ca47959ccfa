use rusqlite::{params, Connection};

use super::{fmt_dt, parse_dt};
use crate::models::Service;

const SERVICE_COLS: &str =
    "id, barbershop_id, name, duration_minutes, price_cents, created_at, updated_at";

pub fn create_service(conn: &Connection, service: &Service) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO services (id, barbershop_id, name, duration_minutes, price_cents, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            service.id,
            service.barbershop_id,
            service.name,
            service.duration_minutes,
            service.price_cents,
            fmt_dt(&service.created_at),
            fmt_dt(&service.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_service(conn: &Connection, barbershop_id: &str, id: &str) -> anyhow::Result<Option<Service>> {
    let sql = format!("SELECT {SERVICE_COLS} FROM services WHERE barbershop_id = ?1 AND id = ?2");
    let result = conn.query_row(&sql, params![barbershop_id, id], parse_service_row);

    match result {
        Ok(service) => Ok(Some(service)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_service_by_name(
    conn: &Connection,
    barbershop_id: &str,
    name: &str,
) -> anyhow::Result<Option<Service>> {
    let sql = format!("SELECT {SERVICE_COLS} FROM services WHERE barbershop_id = ?1 AND name = ?2");
    let result = conn.query_row(&sql, params![barbershop_id, name], parse_service_row);

    match result {
        Ok(service) => Ok(Some(service)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_services(conn: &Connection, barbershop_id: &str) -> anyhow::Result<Vec<Service>> {
    let sql = format!("SELECT {SERVICE_COLS} FROM services WHERE barbershop_id = ?1 ORDER BY name ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![barbershop_id], parse_service_row)?;

    let mut services = vec![];
    for row in rows {
        services.push(row?);
    }
    Ok(services)
}

/// Fetch the given services within a tenant, preserving no particular order.
/// A missing id simply yields fewer rows; callers compare lengths to detect it.
pub fn get_services_by_ids(
    conn: &Connection,
    barbershop_id: &str,
    ids: &[String],
) -> anyhow::Result<Vec<Service>> {
    if ids.is_empty() {
        return Ok(vec![]);
    }

    let placeholders = (2..ids.len() + 2)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "SELECT {SERVICE_COLS} FROM services WHERE barbershop_id = ?1 AND id IN ({placeholders})"
    );

    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> =
        vec![Box::new(barbershop_id.to_string())];
    for id in ids {
        params_vec.push(Box::new(id.clone()));
    }
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_refs.as_slice(), parse_service_row)?;

    let mut services = vec![];
    for row in rows {
        services.push(row?);
    }
    Ok(services)
}

pub fn update_service(conn: &Connection, service: &Service) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE services SET name = ?1, duration_minutes = ?2, price_cents = ?3, updated_at = ?4
         WHERE barbershop_id = ?5 AND id = ?6",
        params![
            service.name,
            service.duration_minutes,
            service.price_cents,
            fmt_dt(&service.updated_at),
            service.barbershop_id,
            service.id,
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_service(conn: &Connection, barbershop_id: &str, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "DELETE FROM services WHERE barbershop_id = ?1 AND id = ?2",
        params![barbershop_id, id],
    )?;
    Ok(count > 0)
}

fn parse_service_row(row: &rusqlite::Row) -> rusqlite::Result<Service> {
    let created_at_str: String = row.get(5)?;
    let updated_at_str: String = row.get(6)?;
    Ok(Service {
        id: row.get(0)?,
        barbershop_id: row.get(1)?,
        name: row.get(2)?,
        duration_minutes: row.get(3)?,
        price_cents: row.get(4)?,
        created_at: parse_dt(&created_at_str),
        updated_at: parse_dt(&updated_at_str),
    })
}
