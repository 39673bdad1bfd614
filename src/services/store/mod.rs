//! Collaborator interfaces consumed by the scheduling grid.
//!
//! The appointment store is the only writer of persisted appointments and
//! must re-check the no-overlap invariant itself on every write; the grid's
//! own validation is advisory.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::appointment::{Appointment, AppointmentPatch, NewAppointment};
use crate::models::resource::{Resource, ResourceCategory};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("appointment {0} not found")]
    NotFound(i64),
    #[error("overlaps existing appointment")]
    Conflict { conflicting_id: i64 },
    #[error("invalid appointment: {0}")]
    Invalid(String),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Backend(err.into())
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait AppointmentStore {
    /// All appointments whose local start date is `date`, cancelled ones included.
    fn list_appointments_for_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, StoreError>;

    fn create_appointment(&self, request: NewAppointment) -> Result<Appointment, StoreError>;

    /// Apply a partial update and return the stored result.
    fn update_appointment(&self, id: i64, patch: AppointmentPatch) -> Result<Appointment, StoreError>;

    /// Mark the appointment cancelled. The record is kept.
    fn cancel_appointment(&self, id: i64) -> Result<(), StoreError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait ResourceCatalog {
    fn list_resources_by_type(&self, category: ResourceCategory) -> Result<Vec<Resource>, StoreError>;
}

impl<T: AppointmentStore + ?Sized> AppointmentStore for &T {
    fn list_appointments_for_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, StoreError> {
        (**self).list_appointments_for_date(date)
    }

    fn create_appointment(&self, request: NewAppointment) -> Result<Appointment, StoreError> {
        (**self).create_appointment(request)
    }

    fn update_appointment(&self, id: i64, patch: AppointmentPatch) -> Result<Appointment, StoreError> {
        (**self).update_appointment(id, patch)
    }

    fn cancel_appointment(&self, id: i64) -> Result<(), StoreError> {
        (**self).cancel_appointment(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_is_user_facing() {
        let err = StoreError::Conflict { conflicting_id: 4 };
        assert_eq!(err.to_string(), "overlaps existing appointment");
    }

    #[test]
    fn test_backend_error_is_transparent() {
        let err = StoreError::from(anyhow::anyhow!("disk full"));
        assert_eq!(err.to_string(), "disk full");
    }

    #[test]
    fn test_sqlite_error_converts() {
        let err = StoreError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(err, StoreError::Backend(_)));
    }
}
