use chrono::{DateTime, Local, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{self, Result, Row};

use crate::models::appointment::{Appointment, AppointmentStatus, ClientInfo};

pub(crate) const APPOINTMENT_COLUMNS: &str = "id, resource_id, start_datetime, end_datetime, status, client, title,
     price_cents, color, created_at, updated_at";

/// UTC, second precision, `Z` suffix. Keeps SQL string comparisons chronological.
/// Writes reject sub-second times in `validate`, so nothing is truncated here.
pub(crate) fn to_storage(value: &DateTime<Local>) -> String {
    value
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn to_local_datetime(value: String) -> Result<DateTime<Local>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

/// `CURRENT_TIMESTAMP` defaults are not RFC 3339; fall back to `None` for those.
fn to_optional_local(value: Option<String>) -> Option<DateTime<Local>> {
    value.and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok().map(|dt| dt.with_timezone(&Local)))
}

pub(crate) fn serialize_client(client: &ClientInfo) -> Result<String> {
    serde_json::to_string(client).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

pub(crate) fn deserialize_client(json: String) -> Result<ClientInfo> {
    serde_json::from_str(&json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))
}

fn parse_status(value: String) -> Result<AppointmentStatus> {
    AppointmentStatus::parse(&value).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            Type::Text,
            format!("unknown appointment status '{}'", value).into(),
        )
    })
}

pub(crate) fn map_appointment_row(row: &Row<'_>) -> Result<Appointment> {
    Ok(Appointment {
        id: row.get(0)?,
        resource_id: row.get(1)?,
        start: to_local_datetime(row.get::<_, String>(2)?)?,
        end: to_local_datetime(row.get::<_, String>(3)?)?,
        status: parse_status(row.get::<_, String>(4)?)?,
        client: deserialize_client(row.get::<_, String>(5)?)?,
        title: row.get(6)?,
        price_cents: row.get(7)?,
        color: row.get(8)?,
        created_at: to_optional_local(row.get(9)?),
        updated_at: to_optional_local(row.get(10)?),
    })
}
