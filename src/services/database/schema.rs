use anyhow::{Context, Result};
use rusqlite::Connection;

use super::migrations;

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    create_settings_table(conn)?;
    run_settings_migrations(conn)?;
    insert_default_settings(conn)?;
    create_resources_table(conn)?;
    create_appointments_table(conn)?;
    run_appointment_migrations(conn)?;
    create_appointment_indexes(conn)?;
    Ok(())
}

fn create_settings_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            day_start_hour INTEGER NOT NULL DEFAULT 9,
            day_end_hour INTEGER NOT NULL DEFAULT 18,
            slot_minutes INTEGER NOT NULL DEFAULT 30,
            drag_threshold REAL NOT NULL DEFAULT 4.0,
            resource_category TEXT NOT NULL DEFAULT 'specialist',
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )
    .context("Failed to create settings table")?;

    Ok(())
}

fn run_settings_migrations(conn: &Connection) -> Result<()> {
    migrations::ensure_column(
        conn,
        "settings",
        "drag_threshold",
        "ALTER TABLE settings ADD COLUMN drag_threshold REAL NOT NULL DEFAULT 4.0",
    )?;

    migrations::ensure_column(
        conn,
        "settings",
        "resource_category",
        "ALTER TABLE settings ADD COLUMN resource_category TEXT NOT NULL DEFAULT 'specialist'",
    )?;

    migrations::ensure_column(
        conn,
        "settings",
        "updated_at",
        "ALTER TABLE settings ADD COLUMN updated_at TEXT",
    )?;

    Ok(())
}

fn insert_default_settings(conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO settings (id, day_start_hour, day_end_hour, slot_minutes)
         VALUES (1, 9, 18, 30)",
        [],
    )
    .context("Failed to insert default settings")?;

    Ok(())
}

fn create_resources_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS resources (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            category TEXT NOT NULL,
            open_time TEXT,
            close_time TEXT,
            sort_order INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )
    .context("Failed to create resources table")?;

    Ok(())
}

fn create_appointments_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS appointments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            resource_id INTEGER NOT NULL REFERENCES resources(id),
            start_datetime TEXT NOT NULL,
            end_datetime TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'confirmed',
            client TEXT NOT NULL,
            title TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )
    .context("Failed to create appointments table")?;

    Ok(())
}

fn run_appointment_migrations(conn: &Connection) -> Result<()> {
    migrations::ensure_column(
        conn,
        "appointments",
        "price_cents",
        "ALTER TABLE appointments ADD COLUMN price_cents INTEGER",
    )?;

    migrations::ensure_column(
        conn,
        "appointments",
        "color",
        "ALTER TABLE appointments ADD COLUMN color TEXT",
    )?;

    Ok(())
}

fn create_appointment_indexes(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_appointments_resource_start
         ON appointments (resource_id, start_datetime)",
        [],
    )
    .context("Failed to create appointment index")?;

    Ok(())
}
