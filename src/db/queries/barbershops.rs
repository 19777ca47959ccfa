use rusqlite::{params, Connection};

use super::{fmt_dt, parse_dt};
use crate::models::Barbershop;

pub fn create_barbershop(conn: &Connection, shop: &Barbershop) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO barbershops (id, name, slug, phone, address, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            shop.id,
            shop.name,
            shop.slug,
            shop.phone,
            shop.address,
            fmt_dt(&shop.created_at),
            fmt_dt(&shop.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_barbershop(conn: &Connection, id: &str) -> anyhow::Result<Option<Barbershop>> {
    let result = conn.query_row(
        "SELECT id, name, slug, phone, address, created_at, updated_at
         FROM barbershops WHERE id = ?1",
        params![id],
        parse_barbershop_row,
    );

    match result {
        Ok(shop) => Ok(Some(shop)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_barbershop_by_slug(conn: &Connection, slug: &str) -> anyhow::Result<Option<Barbershop>> {
    let result = conn.query_row(
        "SELECT id, name, slug, phone, address, created_at, updated_at
         FROM barbershops WHERE slug = ?1",
        params![slug],
        parse_barbershop_row,
    );

    match result {
        Ok(shop) => Ok(Some(shop)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_barbershops(conn: &Connection) -> anyhow::Result<Vec<Barbershop>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, slug, phone, address, created_at, updated_at
         FROM barbershops ORDER BY name ASC",
    )?;

    let rows = stmt.query_map([], parse_barbershop_row)?;

    let mut shops = vec![];
    for row in rows {
        shops.push(row?);
    }
    Ok(shops)
}

pub fn update_barbershop(conn: &Connection, shop: &Barbershop) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE barbershops SET name = ?1, slug = ?2, phone = ?3, address = ?4, updated_at = ?5
         WHERE id = ?6",
        params![
            shop.name,
            shop.slug,
            shop.phone,
            shop.address,
            fmt_dt(&shop.updated_at),
            shop.id,
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_barbershop(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM barbershops WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

fn parse_barbershop_row(row: &rusqlite::Row) -> rusqlite::Result<Barbershop> {
    let created_at_str: String = row.get(5)?;
    let updated_at_str: String = row.get(6)?;
    Ok(Barbershop {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        phone: row.get(3)?,
        address: row.get(4)?,
        created_at: parse_dt(&created_at_str),
        updated_at: parse_dt(&updated_at_str),
    })
}
