use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use super::{fmt_dt, parse_dt};
use crate::models::LandingPage;

/// Every barbershop gets an unpublished landing row at creation time, so
/// config reads never 404 for an existing tenant.
pub fn create_default(conn: &Connection, barbershop_id: &str, now: &NaiveDateTime) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO landing_pages (barbershop_id, updated_at) VALUES (?1, ?2)",
        params![barbershop_id, fmt_dt(now)],
    )?;
    Ok(())
}

pub fn get_landing(conn: &Connection, barbershop_id: &str) -> anyhow::Result<Option<LandingPage>> {
    let result = conn.query_row(
        "SELECT barbershop_id, title, about, theme_color, contact_phone, contact_email,
                published, logo IS NOT NULL, updated_at
         FROM landing_pages WHERE barbershop_id = ?1",
        params![barbershop_id],
        parse_landing_row,
    );

    match result {
        Ok(page) => Ok(Some(page)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_landing(conn: &Connection, page: &LandingPage) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE landing_pages
         SET title = ?1, about = ?2, theme_color = ?3, contact_phone = ?4, contact_email = ?5, updated_at = ?6
         WHERE barbershop_id = ?7",
        params![
            page.title,
            page.about,
            page.theme_color,
            page.contact_phone,
            page.contact_email,
            fmt_dt(&page.updated_at),
            page.barbershop_id,
        ],
    )?;
    Ok(count > 0)
}

pub fn set_published(
    conn: &Connection,
    barbershop_id: &str,
    published: bool,
    now: &NaiveDateTime,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE landing_pages SET published = ?1, updated_at = ?2 WHERE barbershop_id = ?3",
        params![published as i32, fmt_dt(now), barbershop_id],
    )?;
    Ok(count > 0)
}

pub fn set_logo(
    conn: &Connection,
    barbershop_id: &str,
    logo: &[u8],
    content_type: &str,
    now: &NaiveDateTime,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE landing_pages SET logo = ?1, logo_content_type = ?2, updated_at = ?3
         WHERE barbershop_id = ?4",
        params![logo, content_type, fmt_dt(now), barbershop_id],
    )?;
    Ok(count > 0)
}

pub fn get_logo(conn: &Connection, barbershop_id: &str) -> anyhow::Result<Option<(Vec<u8>, String)>> {
    let result = conn.query_row(
        "SELECT logo, logo_content_type FROM landing_pages
         WHERE barbershop_id = ?1 AND logo IS NOT NULL",
        params![barbershop_id],
        |row| {
            let logo: Vec<u8> = row.get(0)?;
            let content_type: String = row.get(1)?;
            Ok((logo, content_type))
        },
    );

    match result {
        Ok(pair) => Ok(Some(pair)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_landing_row(row: &rusqlite::Row) -> rusqlite::Result<LandingPage> {
    let updated_at_str: String = row.get(8)?;
    Ok(LandingPage {
        barbershop_id: row.get(0)?,
        title: row.get(1)?,
        about: row.get(2)?,
        theme_color: row.get(3)?,
        contact_phone: row.get(4)?,
        contact_email: row.get(5)?,
        published: row.get::<_, i32>(6)? != 0,
        has_logo: row.get::<_, i32>(7)? != 0,
        updated_at: parse_dt(&updated_at_str),
    })
}
