// Appointment Grid
// Main entry point: prints one day of the grid as text

use anyhow::{Context, Result};
use appointment_grid::grid::SchedulingGrid;
use appointment_grid::models::settings::GridSettings;
use appointment_grid::services::appointment::AppointmentService;
use appointment_grid::services::database::Database;
use appointment_grid::services::resource::ResourceService;
use appointment_grid::services::settings::SettingsService;
use chrono::{Local, NaiveDate};
#[cfg(not(debug_assertions))]
use directories::ProjectDirs;

const COLUMN_WIDTH: usize = 16;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    log::info!("Starting Appointment Grid");

    let date = match std::env::args().nth(1) {
        Some(arg) => NaiveDate::parse_from_str(&arg, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", arg))?,
        None => Local::now().date_naive(),
    };

    let db_path = resolve_db_path()?;
    let db = Database::new(&db_path).context("Failed to create database connection")?;
    db.initialize_schema()
        .context("Failed to initialize database schema")?;

    let settings = load_settings_or_default(&SettingsService::new(&db));
    let store = AppointmentService::new(db.connection());
    let catalog = ResourceService::new(db.connection());

    let grid = SchedulingGrid::from_catalog(store, &catalog, &settings, date)
        .context("Failed to load the scheduling grid")?;

    if grid.resources().is_empty() {
        println!(
            "No {} resources configured in {}",
            settings.resource_category.as_str(), db_path
        );
        return Ok(());
    }

    print!("{}", render_day(&grid));
    Ok(())
}

fn resolve_db_path() -> Result<String> {
    #[cfg(debug_assertions)]
    let db_path = "appointment_grid.db".to_string();

    #[cfg(not(debug_assertions))]
    let db_path = {
        if let Some(proj_dirs) = ProjectDirs::from("com", "AppointmentGrid", "AppointmentGrid") {
            let data_dir = proj_dirs.data_dir();
            std::fs::create_dir_all(data_dir).context("Failed to create data directory")?;
            data_dir
                .join("appointment_grid.db")
                .to_string_lossy()
                .to_string()
        } else {
            "appointment_grid_prod.db".to_string()
        }
    };

    Ok(db_path)
}

fn load_settings_or_default(settings_service: &SettingsService) -> GridSettings {
    match settings_service.get() {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("Failed to load settings: {}, using defaults", e);
            GridSettings::default()
        }
    }
}

fn render_day(grid: &SchedulingGrid<AppointmentService<'_>>) -> String {
    let mut out = format!("{}\n", grid.selected_date().format("%A %d %B %Y"));

    out.push_str(&format!("{:<6}", ""));
    for resource in grid.resources() {
        out.push_str(&format!("| {:<width$}", clip(&resource.name), width = COLUMN_WIDTH));
    }
    out.push('\n');

    for slot in grid.slots() {
        out.push_str(&format!("{:<6}", slot.to_string()));
        for resource in grid.resources() {
            let cell = grid.cell(resource.id, *slot);
            let text = match cell.appointment_id.and_then(|id| grid.appointment(id)) {
                Some(appointment) if cell.is_span_start => {
                    let marker = if cell.muted { "x " } else { "" };
                    clip(&format!("{}{}", marker, appointment.title))
                }
                Some(_) => "  :".to_string(),
                None => String::new(),
            };
            out.push_str(&format!("| {:<width$}", text, width = COLUMN_WIDTH));
        }
        out.push('\n');
    }
    out
}

fn clip(text: &str) -> String {
    text.chars().take(COLUMN_WIDTH).collect()
}
