//! Read-only acceptance checks for moving or booking an appointment.

use chrono::{DateTime, Local, NaiveTime};
use thiserror::Error;

use crate::models::appointment::Appointment;
use crate::models::resource::{Resource, WorkingHours};

/// Why a candidate move was refused. Display strings are user-facing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveRejection {
    #[error("not found")]
    NotFound,
    #[error("end must be after start")]
    InvalidInterval,
    #[error("resource not found")]
    UnknownResource,
    #[error("overlaps existing appointment")]
    Overlap { conflicting_id: i64 },
    #[error("outside working hours")]
    OutsideWorkingHours,
}

/// Outcome of a single validation. Produced fresh per candidate, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub reason: Option<MoveRejection>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn rejected(reason: MoveRejection) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// User-facing reason, if rejected.
    pub fn reason_text(&self) -> Option<String> {
        self.reason.as_ref().map(ToString::to_string)
    }

    pub fn into_result(self) -> Result<(), MoveRejection> {
        match self.reason {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }
}

pub struct MoveValidator<'a> {
    appointments: &'a [Appointment],
    resources: &'a [Resource],
    day_window: WorkingHours,
}

impl<'a> MoveValidator<'a> {
    /// `day_window` applies to resources without their own working hours.
    pub fn new(
        appointments: &'a [Appointment],
        resources: &'a [Resource],
        day_window: (NaiveTime, NaiveTime),
    ) -> Self {
        Self {
            appointments,
            resources,
            day_window: WorkingHours::new(day_window.0, day_window.1),
        }
    }

    /// Decide whether `appointment_id` may move to `[new_start, new_end)` on `new_resource_id`.
    pub fn validate_move(
        &self,
        appointment_id: i64,
        new_start: DateTime<Local>,
        new_end: DateTime<Local>,
        new_resource_id: i64,
    ) -> ValidationResult {
        if !self.appointments.iter().any(|a| a.id == appointment_id) {
            return ValidationResult::rejected(MoveRejection::NotFound);
        }
        self.check_slot(Some(appointment_id), new_resource_id, new_start, new_end)
    }

    /// Same rules as a move, for a booking that does not exist yet.
    pub fn validate_booking(
        &self,
        resource_id: i64,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> ValidationResult {
        self.check_slot(None, resource_id, start, end)
    }

    fn check_slot(
        &self,
        exclude_id: Option<i64>,
        resource_id: i64,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> ValidationResult {
        if start >= end {
            return ValidationResult::rejected(MoveRejection::InvalidInterval);
        }

        let Some(resource) = self.resources.iter().find(|r| r.id == resource_id) else {
            return ValidationResult::rejected(MoveRejection::UnknownResource);
        };

        let date = start.date_naive();
        let conflict = self.appointments.iter().find(|existing| {
            Some(existing.id) != exclude_id
                && existing.resource_id == resource_id
                && existing.blocks_schedule()
                && existing.date() == date
                && existing.overlaps(start, end)
        });
        if let Some(existing) = conflict {
            return ValidationResult::rejected(MoveRejection::Overlap {
                conflicting_id: existing.id,
            });
        }

        let hours = resource.working_hours.unwrap_or(self.day_window);
        if end.date_naive() != date || !hours.contains(start.time(), end.time()) {
            return ValidationResult::rejected(MoveRejection::OutsideWorkingHours);
        }

        ValidationResult::ok()
    }
}
