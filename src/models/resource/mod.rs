//! Resource model for bookable entities.
//!
//! Resources (specialists, rooms, equipment) each own an independent
//! schedule column in the grid. They are read-only for the duration of a
//! scheduling session.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Kind of bookable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceCategory {
    Specialist,
    Room,
    Equipment,
}

impl ResourceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceCategory::Specialist => "specialist",
            ResourceCategory::Room => "room",
            ResourceCategory::Equipment => "equipment",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "specialist" => Some(ResourceCategory::Specialist),
            "room" => Some(ResourceCategory::Room),
            "equipment" => Some(ResourceCategory::Equipment),
            _ => None,
        }
    }
}

/// Opening hours of a single resource within the business day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl WorkingHours {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Self {
        Self { open, close }
    }

    /// True when `[start, end)` lies inside the opening hours.
    pub fn contains(&self, start: NaiveTime, end: NaiveTime) -> bool {
        start >= self.open && end <= self.close
    }
}

/// A bookable resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Unique identifier (database primary key)
    pub id: i64,
    /// Display name shown in the column header
    pub name: String,
    pub category: ResourceCategory,
    /// Overrides the grid's business window when present
    pub working_hours: Option<WorkingHours>,
}

impl Resource {
    pub fn new(id: i64, name: impl Into<String>, category: ResourceCategory) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            working_hours: None,
        }
    }

    pub fn with_working_hours(mut self, open: NaiveTime, close: NaiveTime) -> Self {
        self.working_hours = Some(WorkingHours::new(open, close));
        self
    }

    /// Validate the resource data.
    pub fn validate(&self) -> Result<(), ResourceValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ResourceValidationError::EmptyName);
        }
        if name.len() > 80 {
            return Err(ResourceValidationError::NameTooLong);
        }
        if let Some(hours) = self.working_hours {
            if hours.close <= hours.open {
                return Err(ResourceValidationError::InvalidWorkingHours);
            }
        }
        Ok(())
    }
}

/// Validation errors for Resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceValidationError {
    EmptyName,
    NameTooLong,
    InvalidWorkingHours,
}

impl std::fmt::Display for ResourceValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Resource name cannot be empty"),
            Self::NameTooLong => write!(f, "Resource name must be 80 characters or less"),
            Self::InvalidWorkingHours => write!(f, "Working hours must close after they open"),
        }
    }
}

impl std::error::Error for ResourceValidationError {}
