// Scheduling grid: slot math, occupancy, move validation, drag handling
// and the orchestrator that ties them to an appointment store.

pub mod drag;
pub mod events;
pub mod layout;
pub mod occupancy;
pub mod scheduling_grid;
pub mod session;
pub mod time_grid;
pub mod validator;

pub use drag::{DragController, DragPhase, DropDecision, MoveRequest, PointerKind};
pub use events::{CommitOutcome, GridEvent, HapticFeedback, Notice, NoticeLevel};
pub use layout::{hit_test, CellRef, GridLayout};
pub use occupancy::OccupancyIndex;
pub use scheduling_grid::{CellState, DragOutcome, DragOutcomeKind, GridError, SchedulingGrid};
pub use session::{Panel, SessionState};
pub use time_grid::{SlotLabel, TimeGrid};
pub use validator::{MoveRejection, MoveValidator, ValidationResult};
