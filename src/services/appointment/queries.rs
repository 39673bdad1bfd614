use super::shared::{map_appointment_row, to_storage, APPOINTMENT_COLUMNS};
use super::AppointmentService;
use crate::models::appointment::Appointment;
use crate::utils::date::{end_of_day_exclusive, start_of_day};
use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate};
use rusqlite::{self, params, OptionalExtension};

impl<'a> AppointmentService<'a> {
    /// Appointments starting on `date` (local), cancelled included, ordered by start.
    pub fn list_for_date(&self, date: NaiveDate) -> Result<Vec<Appointment>> {
        let sql = format!(
            "SELECT {} FROM appointments
             WHERE start_datetime >= ?1 AND start_datetime < ?2
             ORDER BY start_datetime ASC, id ASC",
            APPOINTMENT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let appointments = stmt
            .query_map(
                [
                    to_storage(&start_of_day(date)),
                    to_storage(&end_of_day_exclusive(date)),
                ],
                map_appointment_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to load appointments for date")?;

        Ok(appointments)
    }

    /// Every appointment booked on a resource, ordered by start.
    pub fn list_for_resource(&self, resource_id: i64) -> Result<Vec<Appointment>> {
        let sql = format!(
            "SELECT {} FROM appointments
             WHERE resource_id = ?1
             ORDER BY start_datetime ASC",
            APPOINTMENT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let appointments = stmt
            .query_map([resource_id], map_appointment_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(appointments)
    }

    /// First live appointment on `resource_id` intersecting `[start, end)`,
    /// other than `exclude_id`.
    pub fn find_conflict(
        &self,
        resource_id: i64,
        start: DateTime<Local>,
        end: DateTime<Local>,
        exclude_id: Option<i64>,
    ) -> Result<Option<i64>> {
        self.conn
            .query_row(
                "SELECT id FROM appointments
                 WHERE resource_id = ?1
                   AND status != 'cancelled'
                   AND start_datetime < ?2
                   AND end_datetime > ?3
                   AND (?4 IS NULL OR id != ?4)
                 ORDER BY start_datetime ASC
                 LIMIT 1",
                params![resource_id, to_storage(&end), to_storage(&start), exclude_id],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to check for overlapping appointments")
    }
}
