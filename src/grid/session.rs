//! Serializable UI session state owned by the scheduling grid.
//!
//! Each field has one writer: the grid writes `selected_date` and
//! `open_panel`, the drag controller owns `drag`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::drag::DragController;
use super::layout::CellRef;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Panel {
    Details { appointment_id: i64 },
    CreateBooking { cell: CellRef },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub selected_date: NaiveDate,
    pub open_panel: Option<Panel>,
    pub drag: DragController,
}

impl SessionState {
    pub fn new(selected_date: NaiveDate, drag_threshold: f32) -> Self {
        Self {
            selected_date,
            open_panel: None,
            drag: DragController::new(drag_threshold),
        }
    }
}
