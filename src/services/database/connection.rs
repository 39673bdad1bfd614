use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::Connection;

use super::schema;

/// How long a write waits for another connection's immediate transaction.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite handle shared by the appointment, resource and settings services.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the appointment database at `path`.
    ///
    /// # Examples
    /// ```
    /// use appointment_grid::services::database::Database;
    /// let db = Database::new(":memory:").unwrap();
    /// db.initialize_schema().unwrap();
    /// ```
    pub fn new(path: &str) -> Result<Self> {
        let conn =
            Connection::open(path).context(format!("Failed to open database at {}", path))?;
        Self::configure(conn)
    }

    /// Private in-memory database, already migrated.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let db = Self::configure(conn)?;
        db.initialize_schema()?;
        Ok(db)
    }

    fn configure(conn: Connection) -> Result<Self> {
        conn.execute("PRAGMA foreign_keys = ON", [])
            .context("Failed to enable foreign keys")?;

        // A second writer waits on BEGIN IMMEDIATE instead of failing with SQLITE_BUSY.
        conn.busy_timeout(BUSY_TIMEOUT)
            .context("Failed to set busy timeout")?;

        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Creates the settings, resources and appointments tables and applies column migrations.
    pub fn initialize_schema(&self) -> Result<()> {
        schema::initialize_schema(self.connection())
    }
}
