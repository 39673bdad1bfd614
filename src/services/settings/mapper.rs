use crate::models::resource::ResourceCategory;
use crate::models::settings::GridSettings;
use rusqlite::types::Type;
use rusqlite::Row;

pub fn row_to_settings(row: &Row) -> Result<GridSettings, rusqlite::Error> {
    let raw_category: String = row.get(5)?;
    let resource_category = ResourceCategory::parse(&raw_category).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            Type::Text,
            format!("unknown resource category '{}'", raw_category).into(),
        )
    })?;

    Ok(GridSettings {
        id: Some(row.get(0)?),
        day_start_hour: row.get(1)?,
        day_end_hour: row.get(2)?,
        slot_minutes: row.get(3)?,
        drag_threshold: row.get::<_, f64>(4)? as f32,
        resource_category,
    })
}
