//! Notifications the grid hands to the presentation layer.
//!
//! The grid never draws anything itself. It queues [`GridEvent`]s which the
//! UI drains each frame with `SchedulingGrid::take_events`.

use serde::{Deserialize, Serialize};

use super::layout::CellRef;

/// Types of feedback notices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl NoticeLevel {
    /// Get the icon for this notice level
    pub fn icon(&self) -> &'static str {
        match self {
            NoticeLevel::Success => "✓",
            NoticeLevel::Info => "ℹ",
            NoticeLevel::Warning => "⚠",
            NoticeLevel::Error => "✗",
        }
    }
}

/// A brief user-facing message, shown as a toast by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
}

impl Notice {
    pub fn new(message: impl Into<String>, level: NoticeLevel) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, NoticeLevel::Success)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, NoticeLevel::Info)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NoticeLevel::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HapticFeedback {
    Light,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitOutcome {
    Success,
    Failure { reason: String },
}

impl CommitOutcome {
    pub fn failure(reason: impl Into<String>) -> Self {
        CommitOutcome::Failure {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CommitOutcome::Success)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridEvent {
    /// Empty cell clicked; open the create-booking flow pre-filled with this cell
    OpenCreate { cell: CellRef },
    /// Open the details view of an existing appointment
    OpenDetails { appointment_id: i64 },
    DragCommitted {
        appointment_id: i64,
        outcome: CommitOutcome,
    },
    CancelCommitted {
        appointment_id: i64,
        outcome: CommitOutcome,
    },
    Haptic(HapticFeedback),
    Notice(Notice),
}
