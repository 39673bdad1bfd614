use chrono::{DateTime, Duration, Local, NaiveDate};
use egui::Pos2;
use serde::{Deserialize, Serialize};

use super::layout::{hit_test, CellRef, GridLayout};
use super::time_grid::{SlotLabel, TimeGrid};
use super::validator::{MoveRejection, MoveValidator};
use crate::models::appointment::Appointment;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerKind {
    Mouse,
    Touch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragPhase {
    Idle,
    /// Pressed on a block, not yet moved past the noise threshold
    Armed,
    Dragging,
    /// Released on a new cell, commit in flight
    Settling,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DragOperation {
    pub appointment_id: i64,
    pub origin: CellRef,
    pub hover: Option<CellRef>,
    pub duration_minutes: i64,
    pub press_pos: Pos2,
    pub pointer_kind: PointerKind,
    pub active: bool,
}

impl DragOperation {
    pub fn from_appointment(
        appointment: &Appointment,
        origin_slot: SlotLabel,
        press_pos: Pos2,
        pointer_kind: PointerKind,
    ) -> Self {
        Self {
            appointment_id: appointment.id,
            origin: CellRef::new(appointment.resource_id, origin_slot),
            hover: None,
            duration_minutes: appointment.duration().num_minutes(),
            press_pos,
            pointer_kind,
            active: true,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(self.duration_minutes)
    }

    /// A drop outside every cell counts as unchanged.
    pub fn has_changed(&self) -> bool {
        self.hover.is_some_and(|hover| hover != self.origin)
    }
}

/// Relocation handed to the commit path after a valid drop.
#[derive(Clone, Debug, PartialEq)]
pub struct MoveRequest {
    pub appointment_id: i64,
    pub new_resource_id: i64,
    pub new_start: DateTime<Local>,
    pub new_end: DateTime<Local>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DropDecision {
    Unchanged { appointment_id: i64 },
    Rejected { appointment_id: i64, reason: MoveRejection },
    Commit(MoveRequest),
}

/// Pointer-driven drag state machine. Only one drag is tracked at a time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DragController {
    phase: DragPhase,
    operation: Option<DragOperation>,
    threshold: f32,
}

impl DragController {
    pub fn new(threshold: f32) -> Self {
        Self {
            phase: DragPhase::Idle,
            operation: None,
            threshold,
        }
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn operation(&self) -> Option<&DragOperation> {
        self.operation.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.phase == DragPhase::Idle
    }

    /// Cell to highlight while a block is being carried.
    pub fn highlight(&self) -> Option<CellRef> {
        match self.phase {
            DragPhase::Dragging | DragPhase::Settling => {
                self.operation.as_ref().and_then(|op| op.hover)
            }
            DragPhase::Idle | DragPhase::Armed => None,
        }
    }

    /// Arm a drag on `appointment`. Ignored while another drag is unresolved
    /// and for cancelled appointments.
    pub fn begin(
        &mut self,
        appointment: &Appointment,
        origin_slot: SlotLabel,
        press_pos: Pos2,
        pointer_kind: PointerKind,
    ) -> bool {
        if self.phase != DragPhase::Idle || appointment.is_cancelled() {
            return false;
        }

        self.operation = Some(DragOperation::from_appointment(
            appointment,
            origin_slot,
            press_pos,
            pointer_kind,
        ));
        self.phase = match pointer_kind {
            PointerKind::Touch => DragPhase::Dragging,
            PointerKind::Mouse => DragPhase::Armed,
        };
        true
    }

    /// Track the pointer; returns the hovered cell once dragging.
    pub fn update(&mut self, pointer_pos: Pos2, layout: &GridLayout) -> Option<CellRef> {
        let threshold = self.threshold;
        let operation = self.operation.as_mut()?;

        match self.phase {
            DragPhase::Armed => {
                if operation.press_pos.distance(pointer_pos) < threshold {
                    return None;
                }
                self.phase = DragPhase::Dragging;
            }
            DragPhase::Dragging => {}
            DragPhase::Idle | DragPhase::Settling => return None,
        }

        operation.hover = hit_test(pointer_pos, layout);
        operation.hover
    }

    /// Resolve a pointer release. A valid move leaves the controller in
    /// `Settling` until [`settle`](Self::settle) is called.
    pub fn release(
        &mut self,
        date: NaiveDate,
        grid: &TimeGrid,
        validator: &MoveValidator<'_>,
    ) -> Option<DropDecision> {
        if !matches!(self.phase, DragPhase::Armed | DragPhase::Dragging) {
            return None;
        }
        let operation = self.operation.as_ref()?;
        let appointment_id = operation.appointment_id;

        let target = match operation.hover {
            Some(hover) if operation.has_changed() => hover,
            _ => {
                self.reset();
                return Some(DropDecision::Unchanged { appointment_id });
            }
        };

        let new_start = grid.to_timestamp(date, target.slot);
        let new_end = new_start + operation.duration();
        let result = validator.validate_move(appointment_id, new_start, new_end, target.resource_id);

        if let Some(reason) = result.reason {
            self.reset();
            return Some(DropDecision::Rejected {
                appointment_id,
                reason,
            });
        }

        self.phase = DragPhase::Settling;
        Some(DropDecision::Commit(MoveRequest {
            appointment_id,
            new_resource_id: target.resource_id,
            new_start,
            new_end,
        }))
    }

    /// Finish a settling drag once the commit has resolved.
    pub fn settle(&mut self) -> Option<DragOperation> {
        if self.phase != DragPhase::Settling {
            return None;
        }
        let mut finished = self.operation.take()?;
        finished.active = false;
        self.phase = DragPhase::Idle;
        Some(finished)
    }

    pub fn cancel(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.operation = None;
        self.phase = DragPhase::Idle;
    }
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(4.0)
    }
}
