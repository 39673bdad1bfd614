//! Slot-level occupancy queries over one day's appointments.
//!
//! Cancelled appointments stay queryable so they can be drawn muted, but a
//! live appointment always wins when both cover the same cell.

use std::collections::HashMap;

use super::time_grid::{SlotLabel, TimeGrid};
use crate::models::appointment::Appointment;

pub struct OccupancyIndex<'a> {
    grid: TimeGrid,
    slots: &'a [SlotLabel],
    /// Appointments per resource, sorted by start
    by_resource: HashMap<i64, Vec<&'a Appointment>>,
}

impl<'a> OccupancyIndex<'a> {
    pub fn new(grid: TimeGrid, slots: &'a [SlotLabel], appointments: &'a [Appointment]) -> Self {
        let mut by_resource: HashMap<i64, Vec<&'a Appointment>> = HashMap::new();
        for appointment in appointments {
            by_resource
                .entry(appointment.resource_id)
                .or_default()
                .push(appointment);
        }
        for entries in by_resource.values_mut() {
            entries.sort_by_key(|appointment| (appointment.start, appointment.id));
        }

        Self {
            grid,
            slots,
            by_resource,
        }
    }

    fn start_label(&self, appointment: &Appointment) -> SlotLabel {
        self.grid.to_slot_label(&appointment.start)
    }

    fn end_label(&self, appointment: &Appointment) -> SlotLabel {
        self.grid.to_slot_label(&appointment.end)
    }

    fn on_resource(&self, resource_id: i64) -> impl Iterator<Item = &'a Appointment> + '_ {
        self.by_resource
            .get(&resource_id)
            .into_iter()
            .flat_map(|entries| entries.iter().copied())
    }

    /// Appointment whose `[start label, end label)` range contains `slot` on `resource_id`.
    pub fn appointment_at(&self, resource_id: i64, slot: SlotLabel) -> Option<&'a Appointment> {
        let mut cancelled_match = None;
        for appointment in self.on_resource(resource_id) {
            if self.start_label(appointment) <= slot && slot < self.end_label(appointment) {
                if appointment.blocks_schedule() {
                    return Some(appointment);
                }
                cancelled_match.get_or_insert(appointment);
            }
        }
        cancelled_match
    }

    /// True iff an appointment on `resource_id` starts exactly at `slot`.
    pub fn is_slot_start(&self, resource_id: i64, slot: SlotLabel) -> bool {
        self.on_resource(resource_id)
            .any(|appointment| self.start_label(appointment) == slot)
    }

    /// Appointment anchored at `slot`, preferring a live one over a cancelled one.
    pub fn block_starting_at(&self, resource_id: i64, slot: SlotLabel) -> Option<&'a Appointment> {
        let mut starting = self
            .on_resource(resource_id)
            .filter(|appointment| self.start_label(appointment) == slot);
        let first = starting.next()?;
        if first.blocks_schedule() {
            return Some(first);
        }
        Some(starting.find(|appointment| appointment.blocks_schedule()).unwrap_or(first))
    }

    /// Number of grid rows the appointment covers, at least 1.
    pub fn span_slots(&self, appointment: &Appointment) -> usize {
        let start = self.start_label(appointment);
        let end = self.end_label(appointment);
        let first_at_or_after = |label: SlotLabel| {
            self.slots
                .iter()
                .position(|slot| *slot >= label)
                .unwrap_or(self.slots.len())
        };

        let start_index = first_at_or_after(start);
        let end_index = first_at_or_after(end);
        end_index.saturating_sub(start_index).max(1)
    }

    /// Live appointments on `resource_id`, in start order.
    pub fn active_on(&self, resource_id: i64) -> Vec<&'a Appointment> {
        self.on_resource(resource_id)
            .filter(|appointment| appointment.blocks_schedule())
            .collect()
    }
}
