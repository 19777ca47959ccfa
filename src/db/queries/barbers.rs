use rusqlite::{params, Connection};

use super::{fmt_dt, parse_dt};
use crate::models::Barber;

const BARBER_COLS: &str = "id, barbershop_id, name, email, password_hash, active, created_at, updated_at";

pub fn create_barber(conn: &Connection, barber: &Barber) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO barbers (id, barbershop_id, name, email, password_hash, active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            barber.id,
            barber.barbershop_id,
            barber.name,
            barber.email,
            barber.password_hash,
            barber.active as i32,
            fmt_dt(&barber.created_at),
            fmt_dt(&barber.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_barber(conn: &Connection, barbershop_id: &str, id: &str) -> anyhow::Result<Option<Barber>> {
    let sql = format!("SELECT {BARBER_COLS} FROM barbers WHERE barbershop_id = ?1 AND id = ?2");
    let result = conn.query_row(&sql, params![barbershop_id, id], parse_barber_row);

    match result {
        Ok(barber) => Ok(Some(barber)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_barber_by_email(
    conn: &Connection,
    barbershop_id: &str,
    email: &str,
) -> anyhow::Result<Option<Barber>> {
    let sql = format!("SELECT {BARBER_COLS} FROM barbers WHERE barbershop_id = ?1 AND email = ?2");
    let result = conn.query_row(&sql, params![barbershop_id, email], parse_barber_row);

    match result {
        Ok(barber) => Ok(Some(barber)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Cross-tenant lookup used only by barber login and context switch: the same
/// email in several shops is what "multiple tenancies" means here.
pub fn get_barbers_by_email(conn: &Connection, email: &str) -> anyhow::Result<Vec<Barber>> {
    let sql =
        format!("SELECT {BARBER_COLS} FROM barbers WHERE email = ?1 ORDER BY created_at ASC, rowid ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![email], parse_barber_row)?;

    let mut barbers = vec![];
    for row in rows {
        barbers.push(row?);
    }
    Ok(barbers)
}

pub fn list_barbers(conn: &Connection, barbershop_id: &str) -> anyhow::Result<Vec<Barber>> {
    let sql = format!("SELECT {BARBER_COLS} FROM barbers WHERE barbershop_id = ?1 ORDER BY name ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![barbershop_id], parse_barber_row)?;

    let mut barbers = vec![];
    for row in rows {
        barbers.push(row?);
    }
    Ok(barbers)
}

pub fn update_barber(conn: &Connection, barber: &Barber) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE barbers SET name = ?1, email = ?2, active = ?3, updated_at = ?4
         WHERE barbershop_id = ?5 AND id = ?6",
        params![
            barber.name,
            barber.email,
            barber.active as i32,
            fmt_dt(&barber.updated_at),
            barber.barbershop_id,
            barber.id,
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_barber(conn: &Connection, barbershop_id: &str, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "DELETE FROM barbers WHERE barbershop_id = ?1 AND id = ?2",
        params![barbershop_id, id],
    )?;
    Ok(count > 0)
}

fn parse_barber_row(row: &rusqlite::Row) -> rusqlite::Result<Barber> {
    let created_at_str: String = row.get(6)?;
    let updated_at_str: String = row.get(7)?;
    Ok(Barber {
        id: row.get(0)?,
        barbershop_id: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        password_hash: row.get(4)?,
        active: row.get::<_, i32>(5)? != 0,
        created_at: parse_dt(&created_at_str),
        updated_at: parse_dt(&updated_at_str),
    })
}
