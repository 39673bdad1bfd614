//! SQLite-backed appointment store.
//! Every write that changes an appointment's interval or resource re-checks
//! the no-overlap invariant inside an immediate transaction.

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::models::appointment::{Appointment, AppointmentPatch, NewAppointment};
use crate::services::store::{AppointmentStore, StoreError};

pub mod crud;
pub mod queries;
mod shared;

/// Service for managing appointments stored in SQLite.
pub struct AppointmentService<'a> {
    pub(crate) conn: &'a Connection,
}

impl<'a> AppointmentService<'a> {
    /// Create a new AppointmentService with a database connection
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl AppointmentStore for AppointmentService<'_> {
    fn list_appointments_for_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, StoreError> {
        Ok(self.list_for_date(date)?)
    }

    fn create_appointment(&self, request: NewAppointment) -> Result<Appointment, StoreError> {
        self.create(request)
    }

    fn update_appointment(&self, id: i64, patch: AppointmentPatch) -> Result<Appointment, StoreError> {
        self.update(id, patch)
    }

    fn cancel_appointment(&self, id: i64) -> Result<(), StoreError> {
        self.cancel(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::appointment::{AppointmentStatus, ClientInfo};
    use crate::models::resource::{Resource, ResourceCategory};
    use crate::services::database::Database;
    use crate::services::resource::ResourceService;
    use crate::utils::date::resolve_local;
    use chrono::{DateTime, Local};

    fn setup_test_db() -> Database {
        let db = Database::new(":memory:").unwrap();
        db.initialize_schema().unwrap();
        db
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    fn at(hour: u32, minute: u32) -> DateTime<Local> {
        resolve_local(day().and_hms_opt(hour, minute, 0).unwrap())
    }

    fn seed_resources(db: &Database) -> (i64, i64) {
        let resources = ResourceService::new(db.connection());
        let r1 = resources
            .create(&Resource::new(0, "Anna", ResourceCategory::Specialist))
            .unwrap();
        let r2 = resources
            .create(&Resource::new(0, "Ben", ResourceCategory::Specialist))
            .unwrap();
        (r1.id, r2.id)
    }

    fn booking(resource_id: i64, start: (u32, u32), end: (u32, u32)) -> NewAppointment {
        NewAppointment::builder()
            .resource(resource_id)
            .title("Consultation")
            .client(ClientInfo::named("Dana"))
            .start(at(start.0, start.1))
            .end(at(end.0, end.1))
            .build()
            .unwrap()
    }

    #[test]
    fn test_create_appointment() {
        let db = setup_test_db();
        let (r1, _) = seed_resources(&db);
        let service = AppointmentService::new(db.connection());

        let created = service.create(booking(r1, (10, 0), (11, 0))).unwrap();
        assert!(created.id > 0);
        assert_eq!(created.resource_id, r1);
        assert_eq!(created.start, at(10, 0));
        assert_eq!(created.end, at(11, 0));
        assert_eq!(created.status, AppointmentStatus::Confirmed);
        assert_eq!(created.client.name, "Dana");
        assert!(created.created_at.is_some());
    }

    #[test]
    fn test_create_with_optional_fields() {
        let db = setup_test_db();
        let (r1, _) = seed_resources(&db);
        let service = AppointmentService::new(db.connection());

        let request = NewAppointment::builder()
            .resource(r1)
            .title("Color treatment")
            .start(at(13, 0))
            .end(at(15, 0))
            .status(AppointmentStatus::Pending)
            .price_cents(12000)
            .color("#FF5733")
            .build()
            .unwrap();

        let created = service.create(request).unwrap();
        let stored = service.get(created.id).unwrap().unwrap();
        assert_eq!(stored.status, AppointmentStatus::Pending);
        assert_eq!(stored.price_cents, Some(12000));
        assert_eq!(stored.color, Some("#FF5733".to_string()));
    }

    #[test]
    fn test_create_overlapping_is_conflict() {
        let db = setup_test_db();
        let (r1, r2) = seed_resources(&db);
        let service = AppointmentService::new(db.connection());

        let first = service.create(booking(r1, (14, 0), (15, 0))).unwrap();
        let result = service.create(booking(r1, (14, 30), (15, 30)));
        match result {
            Err(StoreError::Conflict { conflicting_id }) => assert_eq!(conflicting_id, first.id),
            other => panic!("expected conflict, got {:?}", other),
        }

        assert!(service.create(booking(r2, (14, 30), (15, 30))).is_ok());
        assert!(service.create(booking(r1, (15, 0), (16, 0))).is_ok());
    }

    #[test]
    fn test_create_for_unknown_resource() {
        let db = setup_test_db();
        let service = AppointmentService::new(db.connection());

        let result = service.create(booking(77, (10, 0), (11, 0)));
        assert!(matches!(result, Err(StoreError::Invalid(_))));
    }

    #[test]
    fn test_create_rejects_sub_second_times() {
        let db = setup_test_db();
        let (r1, _) = seed_resources(&db);
        let service = AppointmentService::new(db.connection());

        let mut request = booking(r1, (10, 0), (11, 0));
        request.start = request.start + chrono::Duration::milliseconds(500);
        match service.create(request) {
            Err(StoreError::Invalid(message)) => {
                assert_eq!(message, "Appointment times must be whole seconds")
            }
            other => panic!("expected invalid request, got {:?}", other),
        }
        assert!(service.list_for_date(day()).unwrap().is_empty());
    }

    #[test]
    fn test_get_nonexistent_appointment() {
        let db = setup_test_db();
        let service = AppointmentService::new(db.connection());

        assert!(service.get(999).unwrap().is_none());
    }

    #[test]
    fn test_update_moves_appointment() {
        let db = setup_test_db();
        let (r1, r2) = seed_resources(&db);
        let service = AppointmentService::new(db.connection());

        let created = service.create(booking(r1, (10, 0), (11, 0))).unwrap();
        let updated = service
            .update(created.id, AppointmentPatch::reschedule(at(12, 0), at(13, 0), r2))
            .unwrap();

        assert_eq!(updated.resource_id, r2);
        assert_eq!(updated.start, at(12, 0));
        assert_eq!(updated.end, at(13, 0));
        assert_eq!(updated.title, created.title);
    }

    #[test]
    fn test_update_rechecks_overlap() {
        let db = setup_test_db();
        let (r1, _) = seed_resources(&db);
        let service = AppointmentService::new(db.connection());

        let a = service.create(booking(r1, (10, 0), (11, 0))).unwrap();
        let b = service.create(booking(r1, (12, 0), (13, 0))).unwrap();

        let result = service.update(a.id, AppointmentPatch::reschedule(at(12, 30), at(13, 30), r1));
        assert!(matches!(result, Err(StoreError::Conflict { conflicting_id }) if conflicting_id == b.id));

        let unchanged = service.get(a.id).unwrap().unwrap();
        assert_eq!(unchanged.start, at(10, 0));
    }

    #[test]
    fn test_update_may_overlap_own_interval() {
        let db = setup_test_db();
        let (r1, _) = seed_resources(&db);
        let service = AppointmentService::new(db.connection());

        let a = service.create(booking(r1, (10, 0), (11, 0))).unwrap();
        let moved = service
            .update(a.id, AppointmentPatch::reschedule(at(10, 30), at(11, 30), r1))
            .unwrap();
        assert_eq!(moved.start, at(10, 30));
    }

    #[test]
    fn test_update_nonexistent_appointment() {
        let db = setup_test_db();
        let (r1, _) = seed_resources(&db);
        let service = AppointmentService::new(db.connection());

        let result = service.update(999, AppointmentPatch::reschedule(at(10, 0), at(11, 0), r1));
        assert!(matches!(result, Err(StoreError::NotFound(999))));
    }

    #[test]
    fn test_update_rejects_inverted_interval() {
        let db = setup_test_db();
        let (r1, _) = seed_resources(&db);
        let service = AppointmentService::new(db.connection());

        let a = service.create(booking(r1, (10, 0), (11, 0))).unwrap();
        let result = service.update(
            a.id,
            AppointmentPatch {
                end: Some(at(9, 0)),
                ..AppointmentPatch::default()
            },
        );
        assert!(matches!(result, Err(StoreError::Invalid(_))));
    }

    #[test]
    fn test_cancel_keeps_record() {
        let db = setup_test_db();
        let (r1, _) = seed_resources(&db);
        let service = AppointmentService::new(db.connection());

        let created = service.create(booking(r1, (10, 0), (11, 0))).unwrap();
        service.cancel(created.id).unwrap();

        let cancelled = service.get(created.id).unwrap().unwrap();
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
        assert_eq!(cancelled.start, created.start);
        assert_eq!(cancelled.end, created.end);
        assert_eq!(cancelled.resource_id, created.resource_id);

        // The freed interval can be booked again.
        assert!(service.create(booking(r1, (10, 0), (11, 0))).is_ok());
    }

    #[test]
    fn test_cancel_nonexistent_appointment() {
        let db = setup_test_db();
        let service = AppointmentService::new(db.connection());

        assert!(matches!(service.cancel(999), Err(StoreError::NotFound(999))));
    }

    #[test]
    fn test_list_for_date_filters_by_day() {
        let db = setup_test_db();
        let (r1, r2) = seed_resources(&db);
        let service = AppointmentService::new(db.connection());

        service.create(booking(r1, (10, 0), (11, 0))).unwrap();
        service.create(booking(r2, (9, 0), (9, 30))).unwrap();

        let next_day = day().succ_opt().unwrap();
        let tomorrow = NewAppointment::builder()
            .resource(r1)
            .title("Follow-up")
            .start(resolve_local(next_day.and_hms_opt(10, 0, 0).unwrap()))
            .end(resolve_local(next_day.and_hms_opt(11, 0, 0).unwrap()))
            .build()
            .unwrap();
        service.create(tomorrow).unwrap();

        let listed = service.list_appointments_for_date(day()).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].start, at(9, 0));
        assert_eq!(listed[1].start, at(10, 0));

        assert_eq!(service.list_for_date(next_day).unwrap().len(), 1);
        assert_eq!(service.list_for_resource(r1).unwrap().len(), 2);
    }

    #[test]
    fn test_find_conflict_ignores_cancelled() {
        let db = setup_test_db();
        let (r1, _) = seed_resources(&db);
        let service = AppointmentService::new(db.connection());

        let created = service.create(booking(r1, (10, 0), (11, 0))).unwrap();
        assert_eq!(
            service.find_conflict(r1, at(10, 30), at(11, 30), None).unwrap(),
            Some(created.id)
        );

        service.cancel(created.id).unwrap();
        assert_eq!(service.find_conflict(r1, at(10, 30), at(11, 30), None).unwrap(), None);
    }
}
