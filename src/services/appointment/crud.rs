use super::shared::{map_appointment_row, serialize_client, to_storage, APPOINTMENT_COLUMNS};
use super::AppointmentService;
use crate::models::appointment::{Appointment, AppointmentPatch, AppointmentStatus, NewAppointment};
use crate::services::store::StoreError;
use anyhow::{Context, Result};
use chrono::Local;
use rusqlite::{self, params, OptionalExtension, Transaction, TransactionBehavior};

impl<'a> AppointmentService<'a> {
    fn begin_write(&self) -> Result<Transaction<'a>> {
        Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .context("Failed to start write transaction")
    }

    /// Insert a booking. Fails with `Conflict` if it would overlap a live
    /// appointment on the same resource.
    pub fn create(&self, request: NewAppointment) -> Result<Appointment, StoreError> {
        request.validate().map_err(StoreError::Invalid)?;

        let tx = self.begin_write()?;

        if !self.resource_exists(request.resource_id)? {
            return Err(StoreError::Invalid(format!(
                "resource {} does not exist",
                request.resource_id
            )));
        }

        if request.status != AppointmentStatus::Cancelled {
            if let Some(conflicting_id) =
                self.find_conflict(request.resource_id, request.start, request.end, None)?
            {
                return Err(StoreError::Conflict { conflicting_id });
            }
        }

        let now = to_storage(&Local::now());
        self.conn
            .execute(
                "INSERT INTO appointments (
                    resource_id, start_datetime, end_datetime, status, client, title,
                    price_cents, color, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    request.resource_id,
                    to_storage(&request.start),
                    to_storage(&request.end),
                    request.status.as_str(),
                    serialize_client(&request.client)?,
                    request.title,
                    request.price_cents,
                    request.color,
                    &now,
                    &now,
                ],
            )
            .context("Failed to insert appointment")?;

        let id = self.conn.last_insert_rowid();
        tx.commit().context("Failed to commit appointment")?;

        log::info!(
            "Created appointment {} on resource {} at {}",
            id,
            request.resource_id,
            request.start
        );
        self.get(id)?.ok_or(StoreError::NotFound(id))
    }

    /// Retrieve an appointment by ID.
    pub fn get(&self, id: i64) -> Result<Option<Appointment>> {
        let sql = format!("SELECT {} FROM appointments WHERE id = ?", APPOINTMENT_COLUMNS);
        self.conn
            .query_row(&sql, [id], map_appointment_row)
            .optional()
            .context("Failed to load appointment")
    }

    /// Apply a reschedule patch, re-checking overlap inside the write transaction.
    pub fn update(&self, id: i64, patch: AppointmentPatch) -> Result<Appointment, StoreError> {
        let tx = self.begin_write()?;

        let current = self.get(id)?.ok_or(StoreError::NotFound(id))?;
        if patch.is_empty() {
            return Ok(current);
        }

        let patched = patch.apply_to(&current);
        patched.validate().map_err(StoreError::Invalid)?;

        if patched.resource_id != current.resource_id && !self.resource_exists(patched.resource_id)? {
            return Err(StoreError::Invalid(format!(
                "resource {} does not exist",
                patched.resource_id
            )));
        }

        if patched.blocks_schedule() {
            if let Some(conflicting_id) =
                self.find_conflict(patched.resource_id, patched.start, patched.end, Some(id))?
            {
                log::warn!(
                    "Rejected update of appointment {}: overlaps appointment {}",
                    id,
                    conflicting_id
                );
                return Err(StoreError::Conflict { conflicting_id });
            }
        }

        self.conn
            .execute(
                "UPDATE appointments SET
                    resource_id = ?, start_datetime = ?, end_datetime = ?, updated_at = ?
                 WHERE id = ?",
                params![
                    patched.resource_id,
                    to_storage(&patched.start),
                    to_storage(&patched.end),
                    to_storage(&Local::now()),
                    id,
                ],
            )
            .context("Failed to update appointment")?;

        tx.commit().context("Failed to commit appointment update")?;
        self.get(id)?.ok_or(StoreError::NotFound(id))
    }

    /// Mark an appointment cancelled. The row is kept with its times intact.
    pub fn cancel(&self, id: i64) -> Result<(), StoreError> {
        let rows_affected = self
            .conn
            .execute(
                "UPDATE appointments SET status = ?, updated_at = ? WHERE id = ?",
                params![
                    AppointmentStatus::Cancelled.as_str(),
                    to_storage(&Local::now()),
                    id
                ],
            )
            .context("Failed to cancel appointment")?;

        if rows_affected == 0 {
            return Err(StoreError::NotFound(id));
        }

        log::info!("Cancelled appointment {}", id);
        Ok(())
    }

    fn resource_exists(&self, resource_id: i64) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM resources WHERE id = ?",
                [resource_id],
                |row| row.get(0),
            )
            .context("Failed to look up resource")?;
        Ok(count > 0)
    }
}
