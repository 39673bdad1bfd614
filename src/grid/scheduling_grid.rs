//! Scheduling grid orchestrator.
//!
//! Holds the displayed day's appointments as a read view over the
//! appointment store. The only mutations are create, move and cancel, and
//! each is applied locally only after the store has confirmed it.

use std::collections::HashSet;

use chrono::{DateTime, Local, NaiveDate};
use egui::{Pos2, Vec2};
use thiserror::Error;

use super::drag::{DragPhase, DropDecision, MoveRequest, PointerKind};
use super::events::{CommitOutcome, GridEvent, HapticFeedback, Notice};
use super::layout::{CellRef, GridLayout};
use super::occupancy::OccupancyIndex;
use super::session::{Panel, SessionState};
use super::time_grid::{SlotLabel, TimeGrid};
use super::validator::{MoveRejection, MoveValidator, ValidationResult};
use crate::models::appointment::{Appointment, AppointmentPatch, AppointmentStatus, NewAppointment};
use crate::models::resource::Resource;
use crate::models::settings::GridSettings;
use crate::services::store::{AppointmentStore, ResourceCatalog, StoreError};

#[derive(Debug, Error)]
pub enum GridError {
    #[error(transparent)]
    Validation(#[from] MoveRejection),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Invalid grid settings: {0}")]
    Settings(String),
}

/// Everything the presentation layer needs to draw one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellState {
    /// Appointment covering this cell, if any
    pub appointment_id: Option<i64>,
    /// True where a block is anchored
    pub is_span_start: bool,
    /// Rows the anchored block covers; 0 when not a span start
    pub span: usize,
    /// Occupant is cancelled and drawn muted
    pub muted: bool,
    /// Current drop target of an active drag
    pub highlighted: bool,
}

/// Terminal result of a pointer release.
#[derive(Debug)]
pub enum DragOutcome {
    Unchanged,
    Rejected(MoveRejection),
    Committed(Appointment),
    Failed(StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcomeKind {
    Unchanged,
    Rejected,
    Committed,
    Failed,
}

impl DragOutcome {
    pub fn kind(&self) -> DragOutcomeKind {
        match self {
            DragOutcome::Unchanged => DragOutcomeKind::Unchanged,
            DragOutcome::Rejected(_) => DragOutcomeKind::Rejected,
            DragOutcome::Committed(_) => DragOutcomeKind::Committed,
            DragOutcome::Failed(_) => DragOutcomeKind::Failed,
        }
    }
}

pub struct SchedulingGrid<S: AppointmentStore> {
    store: S,
    resources: Vec<Resource>,
    time_grid: TimeGrid,
    slots: Vec<SlotLabel>,
    appointments: Vec<Appointment>,
    session: SessionState,
    events: Vec<GridEvent>,
}

impl<S: AppointmentStore> SchedulingGrid<S> {
    /// Build the grid for `date` and load its appointments. Settings are
    /// validated first so a bad window is an error rather than a panic.
    pub fn new(
        store: S,
        resources: Vec<Resource>,
        settings: &GridSettings,
        date: NaiveDate,
    ) -> Result<Self, GridError> {
        settings.validate().map_err(GridError::Settings)?;

        let time_grid = settings.time_grid();
        let mut grid = Self {
            store,
            resources,
            time_grid,
            slots: time_grid.generate_slots(),
            appointments: Vec::new(),
            session: SessionState::new(date, settings.drag_threshold),
            events: Vec::new(),
        };
        grid.appointments = grid.fetch_day(date)?;
        Ok(grid)
    }

    /// Like [`new`](Self::new), with the columns read from a resource catalog.
    pub fn from_catalog<C: ResourceCatalog>(
        store: S,
        catalog: &C,
        settings: &GridSettings,
        date: NaiveDate,
    ) -> Result<Self, GridError> {
        let resources = catalog.list_resources_by_type(settings.resource_category)?;
        Self::new(store, resources, settings, date)
    }

    fn fetch_day(&self, date: NaiveDate) -> Result<Vec<Appointment>, StoreError> {
        let known: HashSet<i64> = self.resources.iter().map(|r| r.id).collect();
        let fetched = self.store.list_appointments_for_date(date)?;

        Ok(fetched
            .into_iter()
            .filter(|appointment| {
                if appointment.date() != date {
                    return false;
                }
                if !known.contains(&appointment.resource_id) {
                    log::warn!(
                        "Appointment {} belongs to resource {} which has no column in this grid",
                        appointment.id,
                        appointment.resource_id
                    );
                    return false;
                }
                true
            })
            .collect())
    }

    /// Switch the displayed day. Other days' data is untouched.
    pub fn select_date(&mut self, date: NaiveDate) -> Result<(), StoreError> {
        let appointments = self.fetch_day(date)?;
        log::info!(
            "Showing {} with {} appointments",
            date,
            appointments.len()
        );

        self.appointments = appointments;
        self.slots = self.time_grid.generate_slots();
        self.session.selected_date = date;
        self.session.open_panel = None;
        if self.session.drag.phase() != DragPhase::Settling {
            self.session.drag.cancel();
        }
        Ok(())
    }

    /// Re-fetch the displayed day from the store.
    pub fn refresh(&mut self) -> Result<(), StoreError> {
        self.appointments = self.fetch_day(self.session.selected_date)?;
        Ok(())
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.session.selected_date
    }

    pub fn slots(&self) -> &[SlotLabel] {
        &self.slots
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn appointment(&self, id: i64) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id == id)
    }

    pub fn time_grid(&self) -> &TimeGrid {
        &self.time_grid
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn occupancy(&self) -> OccupancyIndex<'_> {
        OccupancyIndex::new(self.time_grid, &self.slots, &self.appointments)
    }

    fn validator(&self) -> MoveValidator<'_> {
        MoveValidator::new(&self.appointments, &self.resources, self.time_grid.day_window())
    }

    pub fn cell(&self, resource_id: i64, slot: SlotLabel) -> CellState {
        let index = self.occupancy();
        let occupant = index.appointment_at(resource_id, slot);
        // A block hidden under a live occupant is not anchored here.
        let anchor = index
            .block_starting_at(resource_id, slot)
            .filter(|block| occupant.is_some_and(|o| o.id == block.id));

        CellState {
            appointment_id: occupant.map(|a| a.id),
            is_span_start: anchor.is_some(),
            span: anchor.map(|block| index.span_slots(block)).unwrap_or(0),
            muted: occupant.is_some_and(Appointment::is_cancelled),
            highlighted: self.drag_highlight() == Some(CellRef::new(resource_id, slot)),
        }
    }

    /// Column-per-resource layout in display order.
    pub fn layout(&self, origin: Pos2, cell_size: Vec2) -> GridLayout {
        let ids: Vec<i64> = self.resources.iter().map(|r| r.id).collect();
        GridLayout::uniform(origin, cell_size, &ids, &self.slots)
    }

    pub fn drag_highlight(&self) -> Option<CellRef> {
        self.session.drag.highlight()
    }

    pub fn drag_phase(&self) -> DragPhase {
        self.session.drag.phase()
    }

    /// Drain queued presentation events.
    pub fn take_events(&mut self) -> Vec<GridEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn close_panel(&mut self) {
        self.session.open_panel = None;
    }

    fn open_details(&mut self, appointment_id: i64) {
        self.session.open_panel = Some(Panel::Details { appointment_id });
        self.events.push(GridEvent::OpenDetails { appointment_id });
    }

    /// Occupied cell opens details; empty cell opens the create flow for it.
    pub fn on_cell_click(&mut self, resource_id: i64, slot: SlotLabel) {
        if !self.session.drag.is_idle() {
            return;
        }

        let occupant = self
            .occupancy()
            .appointment_at(resource_id, slot)
            .map(|a| a.id);
        match occupant {
            Some(appointment_id) => self.open_details(appointment_id),
            None => {
                let cell = CellRef::new(resource_id, slot);
                self.session.open_panel = Some(Panel::CreateBooking { cell });
                self.events.push(GridEvent::OpenCreate { cell });
            }
        }
    }

    pub fn on_block_click(&mut self, appointment_id: i64) {
        if self.appointment(appointment_id).is_some() {
            self.open_details(appointment_id);
        }
    }

    /// Press on a block. Returns whether a drag was armed.
    pub fn on_pointer_down(&mut self, appointment_id: i64, pointer_pos: Pos2, kind: PointerKind) -> bool {
        let Some(appointment) = self.appointments.iter().find(|a| a.id == appointment_id) else {
            return false;
        };
        let origin_slot = self.time_grid.to_slot_label(&appointment.start);
        let armed = self
            .session
            .drag
            .begin(appointment, origin_slot, pointer_pos, kind);

        if armed {
            self.events.push(GridEvent::Haptic(HapticFeedback::Light));
        }
        armed
    }

    pub fn on_pointer_move(&mut self, pointer_pos: Pos2, layout: &GridLayout) -> Option<CellRef> {
        self.session.drag.update(pointer_pos, layout)
    }

    /// Release the pointer: validate, commit and report. `None` when no drag was active.
    pub fn on_pointer_up(&mut self) -> Option<DragOutcome> {
        let date = self.session.selected_date;
        let validator =
            MoveValidator::new(&self.appointments, &self.resources, self.time_grid.day_window());
        let decision = self.session.drag.release(date, &self.time_grid, &validator)?;

        let outcome = match decision {
            DropDecision::Unchanged { .. } => DragOutcome::Unchanged,
            DropDecision::Rejected {
                appointment_id,
                reason,
            } => {
                log::warn!("Rejected move of appointment {}: {}", appointment_id, reason);
                self.report_drag_failure(appointment_id, reason.to_string());
                DragOutcome::Rejected(reason)
            }
            DropDecision::Commit(request) => {
                let result = self.commit_move(&request);
                self.session.drag.settle();
                match result {
                    Ok(updated) => {
                        self.events.push(GridEvent::Haptic(HapticFeedback::Success));
                        self.events.push(GridEvent::Notice(Notice::success("Appointment moved")));
                        self.events.push(GridEvent::DragCommitted {
                            appointment_id: request.appointment_id,
                            outcome: CommitOutcome::Success,
                        });
                        DragOutcome::Committed(updated)
                    }
                    Err(GridError::Validation(reason)) => {
                        self.report_drag_failure(request.appointment_id, reason.to_string());
                        DragOutcome::Rejected(reason)
                    }
                    Err(GridError::Store(err)) => {
                        self.report_drag_failure(request.appointment_id, err.to_string());
                        DragOutcome::Failed(err)
                    }
                    Err(err @ GridError::Settings(_)) => {
                        self.report_drag_failure(request.appointment_id, err.to_string());
                        DragOutcome::Failed(StoreError::Backend(err.into()))
                    }
                }
            }
        };
        Some(outcome)
    }

    fn report_drag_failure(&mut self, appointment_id: i64, reason: String) {
        self.events.push(GridEvent::Haptic(HapticFeedback::Error));
        self.events.push(GridEvent::Notice(Notice::error(reason.clone())));
        self.events.push(GridEvent::DragCommitted {
            appointment_id,
            outcome: CommitOutcome::failure(reason),
        });
    }

    /// Read-only check against the displayed day; safe to call any number of times.
    pub fn validate_move(
        &self,
        appointment_id: i64,
        new_start: DateTime<Local>,
        new_end: DateTime<Local>,
        new_resource_id: i64,
    ) -> ValidationResult {
        self.validator()
            .validate_move(appointment_id, new_start, new_end, new_resource_id)
    }

    /// The single move mutation path. Revalidates, then waits for the store
    /// before touching local state. On store failure the day is re-fetched.
    pub fn commit_move(&mut self, request: &MoveRequest) -> Result<Appointment, GridError> {
        self.validate_move(
            request.appointment_id,
            request.new_start,
            request.new_end,
            request.new_resource_id,
        )
        .into_result()?;

        let patch =
            AppointmentPatch::reschedule(request.new_start, request.new_end, request.new_resource_id);
        match self.store.update_appointment(request.appointment_id, patch) {
            Ok(updated) => {
                log::info!(
                    "Moved appointment {} to resource {} at {}",
                    updated.id,
                    updated.resource_id,
                    updated.start
                );
                self.apply_local(updated.clone());
                Ok(updated)
            }
            Err(err) => {
                log::error!("Failed to move appointment {}: {}", request.appointment_id, err);
                if let Err(refresh_err) = self.refresh() {
                    log::warn!("Failed to re-fetch appointments after move failure: {}", refresh_err);
                }
                Err(err.into())
            }
        }
    }

    /// Cancel through the store; the appointment stays in the day set as cancelled.
    pub fn cancel_appointment(&mut self, id: i64) -> Result<(), StoreError> {
        match self.store.cancel_appointment(id) {
            Ok(()) => {
                if let Some(appointment) = self.appointments.iter_mut().find(|a| a.id == id) {
                    appointment.status = AppointmentStatus::Cancelled;
                }
                self.events.push(GridEvent::Notice(Notice::success("Appointment cancelled")));
                self.events.push(GridEvent::CancelCommitted {
                    appointment_id: id,
                    outcome: CommitOutcome::Success,
                });
                Ok(())
            }
            Err(err) => {
                log::error!("Failed to cancel appointment {}: {}", id, err);
                self.events.push(GridEvent::Notice(Notice::error(err.to_string())));
                self.events.push(GridEvent::CancelCommitted {
                    appointment_id: id,
                    outcome: CommitOutcome::failure(err.to_string()),
                });
                Err(err)
            }
        }
    }

    /// Create a booking. Bookings on the displayed day are checked locally first.
    pub fn create_appointment(&mut self, request: NewAppointment) -> Result<Appointment, GridError> {
        if request.start.date_naive() == self.session.selected_date
            && request.status != AppointmentStatus::Cancelled
        {
            self.validator()
                .validate_booking(request.resource_id, request.start, request.end)
                .into_result()?;
        }

        match self.store.create_appointment(request) {
            Ok(created) => {
                log::info!("Booked appointment {} on resource {}", created.id, created.resource_id);
                self.apply_local(created.clone());
                if matches!(self.session.open_panel, Some(Panel::CreateBooking { .. })) {
                    self.session.open_panel = None;
                }
                self.events.push(GridEvent::Notice(Notice::success("Appointment booked")));
                Ok(created)
            }
            Err(err) => {
                log::error!("Failed to create appointment: {}", err);
                self.events.push(GridEvent::Notice(Notice::error(err.to_string())));
                Err(err.into())
            }
        }
    }

    fn apply_local(&mut self, appointment: Appointment) {
        let on_display = appointment.date() == self.session.selected_date
            && self.resources.iter().any(|r| r.id == appointment.resource_id);
        let existing = self.appointments.iter().position(|a| a.id == appointment.id);

        match (existing, on_display) {
            (Some(index), true) => self.appointments[index] = appointment,
            (Some(index), false) => {
                self.appointments.remove(index);
            }
            (None, true) => self.appointments.push(appointment),
            (None, false) => {}
        }
    }
}
