// Appointment module
// Bookable appointment model shared by the grid and the appointment store

use chrono::{DateTime, Duration, Local, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

use crate::utils::date::intervals_overlap;

/// Lifecycle state of an appointment. Cancelled appointments are kept, never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Confirmed,
    Pending,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "confirmed" => Some(AppointmentStatus::Confirmed),
            "pending" => Some(AppointmentStatus::Pending),
            "cancelled" | "canceled" => Some(AppointmentStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client the appointment was booked for.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl ClientInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: None,
            email: None,
        }
    }
}

/// A persisted appointment as returned by the appointment store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub resource_id: i64,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    pub status: AppointmentStatus,
    pub client: ClientInfo,
    pub title: String,
    pub price_cents: Option<i64>,
    pub color: Option<String>, // rendering hint only
    pub created_at: Option<DateTime<Local>>,
    pub updated_at: Option<DateTime<Local>>,
}

impl Appointment {
    /// Get the duration of the appointment
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Calendar date the appointment belongs to (local date of its start).
    pub fn date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == AppointmentStatus::Cancelled
    }

    /// Whether this appointment takes part in conflict checks.
    pub fn blocks_schedule(&self) -> bool {
        !self.is_cancelled()
    }

    /// Half-open `[start, end)` intersection test. Touching boundaries do not overlap.
    pub fn overlaps(&self, start: DateTime<Local>, end: DateTime<Local>) -> bool {
        intervals_overlap(self.start, self.end, start, end)
    }

    /// Validate the appointment
    pub fn validate(&self) -> Result<(), String> {
        validate_fields(&self.title, self.start, self.end, self.color.as_deref())
    }
}

/// Request payload for the create-booking flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub resource_id: i64,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    pub status: AppointmentStatus,
    pub client: ClientInfo,
    pub title: String,
    pub price_cents: Option<i64>,
    pub color: Option<String>,
}

impl NewAppointment {
    /// Create a builder for constructing a booking with optional fields
    pub fn builder() -> NewAppointmentBuilder {
        NewAppointmentBuilder::new()
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_fields(&self.title, self.start, self.end, self.color.as_deref())
    }
}

/// Partial update used by the drag-commit path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppointmentPatch {
    pub start: Option<DateTime<Local>>,
    pub end: Option<DateTime<Local>>,
    pub resource_id: Option<i64>,
}

impl AppointmentPatch {
    pub fn reschedule(start: DateTime<Local>, end: DateTime<Local>, resource_id: i64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            resource_id: Some(resource_id),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none() && self.resource_id.is_none()
    }

    /// Returns a copy of `appointment` with the patch applied.
    pub fn apply_to(&self, appointment: &Appointment) -> Appointment {
        let mut patched = appointment.clone();
        if let Some(start) = self.start {
            patched.start = start;
        }
        if let Some(end) = self.end {
            patched.end = end;
        }
        if let Some(resource_id) = self.resource_id {
            patched.resource_id = resource_id;
        }
        patched
    }
}

fn validate_fields(
    title: &str,
    start: DateTime<Local>,
    end: DateTime<Local>,
    color: Option<&str>,
) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Appointment title cannot be empty".to_string());
    }

    if end <= start {
        return Err("Appointment end time must be after start time".to_string());
    }

    // Stored timestamps carry whole seconds only.
    if start.nanosecond() != 0 || end.nanosecond() != 0 {
        return Err("Appointment times must be whole seconds".to_string());
    }

    if let Some(color) = color {
        if !color.starts_with('#') || (color.len() != 7 && color.len() != 4) {
            return Err("Color must be in hex format (#RRGGBB or #RGB)".to_string());
        }
    }

    Ok(())
}

/// Builder for booking requests
pub struct NewAppointmentBuilder {
    resource_id: Option<i64>,
    start: Option<DateTime<Local>>,
    end: Option<DateTime<Local>>,
    status: AppointmentStatus,
    client: ClientInfo,
    title: Option<String>,
    price_cents: Option<i64>,
    color: Option<String>,
}

impl NewAppointmentBuilder {
    pub fn new() -> Self {
        Self {
            resource_id: None,
            start: None,
            end: None,
            status: AppointmentStatus::Confirmed,
            client: ClientInfo::default(),
            title: None,
            price_cents: None,
            color: None,
        }
    }

    pub fn resource(mut self, resource_id: i64) -> Self {
        self.resource_id = Some(resource_id);
        self
    }

    pub fn start(mut self, start: DateTime<Local>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: DateTime<Local>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn status(mut self, status: AppointmentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn client(mut self, client: ClientInfo) -> Self {
        self.client = client;
        self
    }

    /// Set the service label shown on the block
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn price_cents(mut self, price_cents: i64) -> Self {
        self.price_cents = Some(price_cents);
        self
    }

    /// Set the block color (hex format)
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn build(self) -> Result<NewAppointment, String> {
        let resource_id = self.resource_id.ok_or("Appointment resource is required")?;
        let title = self.title.ok_or("Appointment title is required")?;
        let start = self.start.ok_or("Appointment start time is required")?;
        let end = self.end.ok_or("Appointment end time is required")?;

        let request = NewAppointment {
            resource_id,
            start,
            end,
            status: self.status,
            client: self.client,
            title,
            price_cents: self.price_cents,
            color: self.color,
        };

        request.validate()?;
        Ok(request)
    }
}

impl Default for NewAppointmentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
