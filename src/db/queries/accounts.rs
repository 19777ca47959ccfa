use rusqlite::{params, Connection};

use crate::models::{Admin, ShopAdmin};

// ── Central admins ──

pub fn get_admin_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<Admin>> {
    let result = conn.query_row(
        "SELECT id, email, password_hash FROM admins WHERE email = ?1",
        params![email],
        |row| {
            Ok(Admin {
                id: row.get(0)?,
                email: row.get(1)?,
                password_hash: row.get(2)?,
            })
        },
    );

    match result {
        Ok(admin) => Ok(Some(admin)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Insert the configured central admin if no account with that email exists.
/// Runs at every startup; an existing account is left untouched so a changed
/// env password does not silently rotate credentials.
pub fn seed_admin(conn: &Connection, id: &str, email: &str, password_hash: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "INSERT OR IGNORE INTO admins (id, email, password_hash) VALUES (?1, ?2, ?3)",
        params![id, email, password_hash],
    )?;
    Ok(count > 0)
}

// ── Shop admins ──

pub fn create_shop_admin(conn: &Connection, admin: &ShopAdmin) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO shop_admins (id, barbershop_id, email, name, password_hash)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            admin.id,
            admin.barbershop_id,
            admin.email,
            admin.name,
            admin.password_hash,
        ],
    )?;
    Ok(())
}

pub fn get_shop_admin_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<ShopAdmin>> {
    let result = conn.query_row(
        "SELECT id, barbershop_id, email, name, password_hash
         FROM shop_admins WHERE email = ?1",
        params![email],
        |row| {
            Ok(ShopAdmin {
                id: row.get(0)?,
                barbershop_id: row.get(1)?,
                email: row.get(2)?,
                name: row.get(3)?,
                password_hash: row.get(4)?,
            })
        },
    );

    match result {
        Ok(admin) => Ok(Some(admin)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
