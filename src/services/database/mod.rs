// Database service module
// SQLite connection and schema management for the appointment store

mod connection;
pub mod migrations;
mod schema;

pub use connection::{Database, BUSY_TIMEOUT};
