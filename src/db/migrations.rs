use anyhow::Context;
use rusqlite::Connection;

// Migrations are embedded so that in-memory databases get the same schema
// as file-backed ones. Order matters; names are recorded in _migrations.
static MIGRATIONS: &[(&str, &str)] = &[(
    "001_schema",
    "
    CREATE TABLE barbershops (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        slug TEXT NOT NULL UNIQUE,
        phone TEXT,
        address TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE admins (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE shop_admins (
        id TEXT PRIMARY KEY,
        barbershop_id TEXT NOT NULL REFERENCES barbershops(id) ON DELETE CASCADE,
        email TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE barbers (
        id TEXT PRIMARY KEY,
        barbershop_id TEXT NOT NULL REFERENCES barbershops(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE(barbershop_id, email)
    );

    CREATE TABLE services (
        id TEXT PRIMARY KEY,
        barbershop_id TEXT NOT NULL REFERENCES barbershops(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        duration_minutes INTEGER NOT NULL,
        price_cents INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE(barbershop_id, name)
    );

    CREATE TABLE customers (
        id TEXT PRIMARY KEY,
        barbershop_id TEXT NOT NULL REFERENCES barbershops(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone TEXT,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE(barbershop_id, email)
    );

    CREATE TABLE appointments (
        id TEXT PRIMARY KEY,
        barbershop_id TEXT NOT NULL REFERENCES barbershops(id) ON DELETE CASCADE,
        barber_id TEXT NOT NULL,
        customer_id TEXT NOT NULL,
        start_time TEXT NOT NULL,
        end_time TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        notes TEXT,
        created_at TEXT NOT NULL,
        confirmed_at TEXT,
        cancelled_at TEXT,
        completed_at TEXT
    );

    CREATE INDEX idx_appointments_barber_time
        ON appointments(barber_id, start_time);
    CREATE INDEX idx_appointments_shop_time
        ON appointments(barbershop_id, start_time);

    CREATE TABLE appointment_services (
        appointment_id TEXT NOT NULL REFERENCES appointments(id) ON DELETE CASCADE,
        service_id TEXT NOT NULL,
        PRIMARY KEY (appointment_id, service_id)
    );

    CREATE TABLE landing_pages (
        barbershop_id TEXT PRIMARY KEY REFERENCES barbershops(id) ON DELETE CASCADE,
        title TEXT NOT NULL DEFAULT '',
        about TEXT NOT NULL DEFAULT '',
        theme_color TEXT NOT NULL DEFAULT '#1f2937',
        contact_phone TEXT NOT NULL DEFAULT '',
        contact_email TEXT NOT NULL DEFAULT '',
        published INTEGER NOT NULL DEFAULT 0,
        logo BLOB,
        logo_content_type TEXT,
        updated_at TEXT NOT NULL
    );
    ",
)];

pub fn run_migrations(conn: &Connection) -> anyhow::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .context("failed to create migrations table")?;

    for (name, sql) in MIGRATIONS {
        let already_applied: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .context("failed to check migration status")?;

        if already_applied {
            continue;
        }

        conn.execute_batch(sql)
            .with_context(|| format!("failed to apply migration: {name}"))?;

        conn.execute("INSERT INTO _migrations (name) VALUES (?1)", [name])
            .with_context(|| format!("failed to record migration: {name}"))?;

        tracing::info!("applied migration: {name}");
    }

    Ok(())
}
