use rusqlite::{params, Connection};

use super::{fmt_dt, parse_dt};
use crate::models::Customer;

const CUSTOMER_COLS: &str =
    "id, barbershop_id, name, email, phone, password_hash, created_at, updated_at";

pub fn create_customer(conn: &Connection, customer: &Customer) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO customers (id, barbershop_id, name, email, phone, password_hash, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            customer.id,
            customer.barbershop_id,
            customer.name,
            customer.email,
            customer.phone,
            customer.password_hash,
            fmt_dt(&customer.created_at),
            fmt_dt(&customer.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_customer(conn: &Connection, barbershop_id: &str, id: &str) -> anyhow::Result<Option<Customer>> {
    let sql = format!("SELECT {CUSTOMER_COLS} FROM customers WHERE barbershop_id = ?1 AND id = ?2");
    let result = conn.query_row(&sql, params![barbershop_id, id], parse_customer_row);

    match result {
        Ok(customer) => Ok(Some(customer)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_customer_by_email(
    conn: &Connection,
    barbershop_id: &str,
    email: &str,
) -> anyhow::Result<Option<Customer>> {
    let sql = format!("SELECT {CUSTOMER_COLS} FROM customers WHERE barbershop_id = ?1 AND email = ?2");
    let result = conn.query_row(&sql, params![barbershop_id, email], parse_customer_row);

    match result {
        Ok(customer) => Ok(Some(customer)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_customers(conn: &Connection, barbershop_id: &str) -> anyhow::Result<Vec<Customer>> {
    let sql = format!("SELECT {CUSTOMER_COLS} FROM customers WHERE barbershop_id = ?1 ORDER BY name ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![barbershop_id], parse_customer_row)?;

    let mut customers = vec![];
    for row in rows {
        customers.push(row?);
    }
    Ok(customers)
}

pub fn update_customer(conn: &Connection, customer: &Customer) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE customers SET name = ?1, email = ?2, phone = ?3, updated_at = ?4
         WHERE barbershop_id = ?5 AND id = ?6",
        params![
            customer.name,
            customer.email,
            customer.phone,
            fmt_dt(&customer.updated_at),
            customer.barbershop_id,
            customer.id,
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_customer(conn: &Connection, barbershop_id: &str, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "DELETE FROM customers WHERE barbershop_id = ?1 AND id = ?2",
        params![barbershop_id, id],
    )?;
    Ok(count > 0)
}

fn parse_customer_row(row: &rusqlite::Row) -> rusqlite::Result<Customer> {
    let created_at_str: String = row.get(6)?;
    let updated_at_str: String = row.get(7)?;
    Ok(Customer {
        id: row.get(0)?,
        barbershop_id: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        password_hash: row.get(5)?,
        created_at: parse_dt(&created_at_str),
        updated_at: parse_dt(&updated_at_str),
    })
}
