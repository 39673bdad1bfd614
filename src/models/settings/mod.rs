// Settings module
// Persisted configuration for the scheduling grid

use serde::{Deserialize, Serialize};

use crate::grid::time_grid::TimeGrid;
use crate::models::resource::ResourceCategory;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSettings {
    pub id: Option<i64>,
    /// Hour of the first slot (inclusive)
    pub day_start_hour: u32,
    /// Hour of the last slot start (inclusive)
    pub day_end_hour: u32,
    pub slot_minutes: u32,
    /// Pointer travel in points before a mouse press turns into a drag
    pub drag_threshold: f32,
    /// Resource type whose columns the grid shows
    pub resource_category: ResourceCategory,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            id: Some(1),
            day_start_hour: 9,
            day_end_hour: 18,
            slot_minutes: 30,
            drag_threshold: 4.0,
            resource_category: ResourceCategory::Specialist,
        }
    }
}

impl GridSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.day_end_hour > 23 {
            return Err("Day end hour must be between 0 and 23".to_string());
        }
        if self.day_start_hour >= self.day_end_hour {
            return Err("Day start hour must be before day end hour".to_string());
        }
        if self.slot_minutes == 0 || 60 % self.slot_minutes != 0 {
            return Err("Slot length must evenly divide an hour".to_string());
        }
        if !self.drag_threshold.is_finite() || self.drag_threshold < 0.0 {
            return Err("Drag threshold must be a non-negative number".to_string());
        }
        Ok(())
    }

    /// Slot layout described by these settings.
    pub fn time_grid(&self) -> TimeGrid {
        TimeGrid::new(self.day_start_hour, self.day_end_hour, self.slot_minutes)
    }
}
