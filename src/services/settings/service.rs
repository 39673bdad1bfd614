use crate::models::settings::GridSettings;
use crate::services::database::Database;
use anyhow::{anyhow, Context, Result};

use super::mapper::row_to_settings;

pub struct SettingsService<'a> {
    db: &'a Database,
}

impl<'a> SettingsService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Get the current settings. A stored row that fails validation is an error.
    pub fn get(&self) -> Result<GridSettings> {
        let conn = self.db.connection();

        let settings = conn
            .query_row(
                "SELECT id, day_start_hour, day_end_hour, slot_minutes, drag_threshold,
                    resource_category
             FROM settings WHERE id = 1",
                [],
                row_to_settings,
            )
            .context("Failed to load settings")?;

        settings
            .validate()
            .map_err(|e| anyhow!("Stored settings are invalid: {}", e))?;

        Ok(settings)
    }

    /// Update settings
    pub fn update(&self, settings: &GridSettings) -> Result<()> {
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;

        let conn = self.db.connection();

        conn.execute(
            "UPDATE settings \
             SET day_start_hour = ?1, \
                 day_end_hour = ?2, \
                 slot_minutes = ?3, \
                 drag_threshold = ?4, \
                 resource_category = ?5, \
                 updated_at = CURRENT_TIMESTAMP \
             WHERE id = 1",
            (
                settings.day_start_hour,
                settings.day_end_hour,
                settings.slot_minutes,
                settings.drag_threshold as f64,
                settings.resource_category.as_str(),
            ),
        )
        .context("Failed to update settings")?;

        Ok(())
    }

    /// Reset settings to defaults
    pub fn reset(&self) -> Result<()> {
        self.update(&GridSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resource::ResourceCategory;

    fn setup_test_db() -> Database {
        let db = Database::new(":memory:").unwrap();
        db.initialize_schema().unwrap();
        db
    }

    #[test]
    fn test_get_default_settings() {
        let db = setup_test_db();
        let service = SettingsService::new(&db);

        let settings = service.get().unwrap();
        assert_eq!(settings, GridSettings::default());
    }

    #[test]
    fn test_update_settings() {
        let db = setup_test_db();
        let service = SettingsService::new(&db);

        let mut settings = service.get().unwrap();
        settings.day_start_hour = 8;
        settings.day_end_hour = 20;
        settings.slot_minutes = 15;
        settings.resource_category = ResourceCategory::Room;
        service.update(&settings).unwrap();

        let loaded = service.get().unwrap();
        assert_eq!(loaded.day_start_hour, 8);
        assert_eq!(loaded.day_end_hour, 20);
        assert_eq!(loaded.slot_minutes, 15);
        assert_eq!(loaded.resource_category, ResourceCategory::Room);
    }

    #[test]
    fn test_update_invalid_settings_rejected() {
        let db = setup_test_db();
        let service = SettingsService::new(&db);

        let settings = GridSettings {
            slot_minutes: 0,
            ..GridSettings::default()
        };
        let result = service.update(&settings);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid settings"));

        assert_eq!(service.get().unwrap().slot_minutes, 30);
    }

    #[test]
    fn test_get_rejects_corrupt_row() {
        let db = setup_test_db();
        let service = SettingsService::new(&db);

        db.connection()
            .execute("UPDATE settings SET slot_minutes = 0 WHERE id = 1", [])
            .unwrap();
        let err = service.get().unwrap_err();
        assert!(err.to_string().contains("Stored settings are invalid"));

        db.connection()
            .execute("UPDATE settings SET slot_minutes = 30, day_end_hour = 30 WHERE id = 1", [])
            .unwrap();
        assert!(service.get().is_err());

        service.reset().unwrap();
        assert_eq!(service.get().unwrap(), GridSettings::default());
    }

    #[test]
    fn test_reset_settings() {
        let db = setup_test_db();
        let service = SettingsService::new(&db);

        let mut settings = service.get().unwrap();
        settings.day_end_hour = 21;
        service.update(&settings).unwrap();

        service.reset().unwrap();
        assert_eq!(service.get().unwrap().day_end_hour, 18);
    }
}
