// Test fixtures - reusable test data
// Provides a seeded database and consistent timestamps across test files
#![allow(dead_code)]

use appointment_grid::models::appointment::{Appointment, ClientInfo, NewAppointment};
use appointment_grid::models::resource::{Resource, ResourceCategory};
use appointment_grid::services::appointment::AppointmentService;
use appointment_grid::services::database::Database;
use appointment_grid::services::resource::ResourceService;
use appointment_grid::utils::date::resolve_local;
use chrono::{DateTime, Local, NaiveDate};

/// Sample dates for testing
pub mod dates {
    use super::*;

    /// Tuesday 10 June 2025, the default grid day
    pub fn grid_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    pub fn next_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 11).unwrap()
    }

    /// Local timestamp on [`grid_day`]
    pub fn at(hour: u32, minute: u32) -> DateTime<Local> {
        on(grid_day(), hour, minute)
    }

    pub fn on(date: NaiveDate, hour: u32, minute: u32) -> DateTime<Local> {
        resolve_local(date.and_hms_opt(hour, minute, 0).unwrap())
    }
}

/// In-memory database with schema applied
pub fn memory_db() -> Database {
    Database::in_memory().expect("Failed to create database")
}

/// Two specialists (R1, R2) and one room, in display order
pub fn seed_resources(db: &Database) -> (Resource, Resource, Resource) {
    let service = ResourceService::new(db.connection());
    let r1 = service
        .create(&Resource::new(0, "R1", ResourceCategory::Specialist))
        .expect("Failed to create R1");
    let r2 = service
        .create(&Resource::new(0, "R2", ResourceCategory::Specialist))
        .expect("Failed to create R2");
    let room = service
        .create(&Resource::new(0, "Treatment Room", ResourceCategory::Room))
        .expect("Failed to create room");
    (r1, r2, room)
}

pub fn book(
    db: &Database,
    resource_id: i64,
    title: &str,
    start: DateTime<Local>,
    end: DateTime<Local>,
) -> Appointment {
    let request = NewAppointment::builder()
        .resource(resource_id)
        .title(title)
        .client(ClientInfo::named("Jordan Client"))
        .start(start)
        .end(end)
        .build()
        .expect("Fixture booking should be valid");
    AppointmentService::new(db.connection())
        .create(request)
        .expect("Fixture booking should be stored")
}
