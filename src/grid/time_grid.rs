//! Slot generation and slot/timestamp conversion for one business day.
//!
//! A slot is identified by its wall-clock start label ("09:30"). Slots are
//! never stored; the grid regenerates them for the selected date.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::date::resolve_local;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotLabelError {
    #[error("malformed slot label '{0}'")]
    Malformed(String),
}

/// Start label of a grid row, always whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotLabel(NaiveTime);

impl SlotLabel {
    /// Panics when `hour`/`minute` are out of range.
    pub fn new(hour: u32, minute: u32) -> Self {
        match NaiveTime::from_hms_opt(hour, minute, 0) {
            Some(time) => Self(time),
            None => panic!("slot label {:02}:{:02} is out of range", hour, minute),
        }
    }

    /// Label for the hour:minute of `time`, dropping seconds.
    pub fn from_time(time: NaiveTime) -> Self {
        Self::new(time.hour(), time.minute())
    }

    pub fn parse(value: &str) -> Result<Self, SlotLabelError> {
        let trimmed = value.trim();
        let (hour, minute) = trimmed
            .split_once(':')
            .ok_or_else(|| SlotLabelError::Malformed(value.to_string()))?;

        let valid_digits = |part: &str, max_len: usize| {
            !part.is_empty() && part.len() <= max_len && part.chars().all(|c| c.is_ascii_digit())
        };
        if !valid_digits(hour, 2) || minute.len() != 2 || !valid_digits(minute, 2) {
            return Err(SlotLabelError::Malformed(value.to_string()));
        }

        let hour: u32 = hour
            .parse()
            .map_err(|_| SlotLabelError::Malformed(value.to_string()))?;
        let minute: u32 = minute
            .parse()
            .map_err(|_| SlotLabelError::Malformed(value.to_string()))?;

        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| SlotLabelError::Malformed(value.to_string()))
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }
}

impl std::fmt::Display for SlotLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

impl std::str::FromStr for SlotLabel {
    type Err = SlotLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SlotLabel {
    type Error = SlotLabelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SlotLabel> for String {
    fn from(label: SlotLabel) -> Self {
        label.to_string()
    }
}

/// Ordered slot labels from `start_hour:00` through `end_hour:00` inclusive.
pub fn generate_slots(start_hour: u32, end_hour: u32, step_minutes: u32) -> Vec<SlotLabel> {
    assert!(step_minutes > 0, "slot step must be positive");
    let first = start_hour * 60;
    let last = (end_hour * 60).min(23 * 60 + 59);

    (first..=last)
        .step_by(step_minutes as usize)
        .map(|minutes| SlotLabel::new(minutes / 60, minutes % 60))
        .collect()
}

/// Business-day slot layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeGrid {
    start_hour: u32,
    end_hour: u32,
    step_minutes: u32,
}

impl Default for TimeGrid {
    fn default() -> Self {
        Self::new(9, 18, 30)
    }
}

impl TimeGrid {
    pub fn new(start_hour: u32, end_hour: u32, step_minutes: u32) -> Self {
        assert!(step_minutes > 0, "slot step must be positive");
        assert!(
            start_hour <= end_hour && end_hour <= 23,
            "invalid business window {}..{}",
            start_hour,
            end_hour
        );
        Self {
            start_hour,
            end_hour,
            step_minutes,
        }
    }

    pub fn generate_slots(&self) -> Vec<SlotLabel> {
        generate_slots(self.start_hour, self.end_hour, self.step_minutes)
    }

    pub fn step(&self) -> Duration {
        Duration::minutes(self.step_minutes as i64)
    }

    /// Local hour:minute of `timestamp`. Not rounded to the grid step.
    pub fn to_slot_label(&self, timestamp: &DateTime<Local>) -> SlotLabel {
        SlotLabel::from_time(timestamp.time())
    }

    /// `date` at the label's hour:minute, zero seconds. Out-of-window labels are accepted.
    pub fn to_timestamp(&self, date: NaiveDate, label: SlotLabel) -> DateTime<Local> {
        resolve_local(date.and_time(label.time()))
    }

    pub fn first_slot(&self) -> SlotLabel {
        SlotLabel::new(self.start_hour, 0)
    }

    pub fn last_slot(&self) -> SlotLabel {
        SlotLabel::new(self.end_hour, 0)
    }

    /// Opening time and closing time of the day; the last slot runs one step past `end_hour`.
    pub fn day_window(&self) -> (NaiveTime, NaiveTime) {
        let open = self.first_slot().time();
        let close_minutes = self.end_hour * 60 + self.step_minutes;
        let close = if close_minutes >= 24 * 60 {
            NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
        } else {
            NaiveTime::from_hms_opt(close_minutes / 60, close_minutes % 60, 0)
                .unwrap_or(NaiveTime::MIN)
        };
        (open, close)
    }

    /// Whether `label` is one of the rendered rows.
    pub fn contains(&self, label: SlotLabel) -> bool {
        let minutes = label.hour() * 60 + label.minute();
        let first = self.start_hour * 60;
        let last = self.end_hour * 60;
        minutes >= first && minutes <= last && (minutes - first) % self.step_minutes == 0
    }
}
