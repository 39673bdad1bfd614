//! Cell geometry and pointer hit-testing.
//!
//! The presentation layer reports where it drew each cell; hit-testing is a
//! pure lookup over those rectangles so it runs without a UI tree.

use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use super::time_grid::SlotLabel;

/// A (resource column, slot row) grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRef {
    pub resource_id: i64,
    pub slot: SlotLabel,
}

impl CellRef {
    pub fn new(resource_id: i64, slot: SlotLabel) -> Self {
        Self { resource_id, slot }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellBounds {
    pub cell: CellRef,
    pub rect: Rect,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridLayout {
    cells: Vec<CellBounds>,
}

impl GridLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cell: CellRef, rect: Rect) {
        self.cells.push(CellBounds { cell, rect });
    }

    /// One column per resource, one row per slot, starting at `origin`.
    pub fn uniform(
        origin: Pos2,
        cell_size: Vec2,
        resource_ids: &[i64],
        slots: &[SlotLabel],
    ) -> Self {
        let mut layout = Self::new();
        for (column, resource_id) in resource_ids.iter().enumerate() {
            for (row, slot) in slots.iter().enumerate() {
                let min = origin + Vec2::new(column as f32 * cell_size.x, row as f32 * cell_size.y);
                layout.push(
                    CellRef::new(*resource_id, *slot),
                    Rect::from_min_size(min, cell_size),
                );
            }
        }
        layout
    }

    pub fn cells(&self) -> &[CellBounds] {
        &self.cells
    }

    pub fn rect_for(&self, cell: CellRef) -> Option<Rect> {
        self.cells
            .iter()
            .find(|bounds| bounds.cell == cell)
            .map(|bounds| bounds.rect)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Cell under `pointer`. Cell rects are treated as half-open so shared edges
/// belong to the cell to the right/below.
pub fn hit_test(pointer: Pos2, layout: &GridLayout) -> Option<CellRef> {
    layout
        .cells
        .iter()
        .find(|bounds| {
            let rect = bounds.rect;
            pointer.x >= rect.min.x
                && pointer.x < rect.max.x
                && pointer.y >= rect.min.y
                && pointer.y < rect.max.y
        })
        .map(|bounds| bounds.cell)
}
