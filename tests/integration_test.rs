// Integration tests for the scheduling grid over the SQLite store
mod fixtures;

use appointment_grid::grid::{
    CellRef, CommitOutcome, DragOutcome, DragPhase, GridEvent, PointerKind, SchedulingGrid,
    SlotLabel,
};
use appointment_grid::models::appointment::{AppointmentStatus, NewAppointment};
use appointment_grid::models::resource::ResourceCategory;
use appointment_grid::models::settings::GridSettings;
use appointment_grid::services::appointment::AppointmentService;
use appointment_grid::services::database::Database;
use appointment_grid::services::resource::ResourceService;
use appointment_grid::services::settings::SettingsService;
use appointment_grid::services::store::{AppointmentStore, StoreError};
use egui::{pos2, Pos2, Vec2};
use fixtures::dates::{at, grid_day, next_day, on};
use fixtures::{book, memory_db, seed_resources};
use pretty_assertions::assert_eq;

fn open_grid(db: &Database) -> SchedulingGrid<AppointmentService<'_>> {
    let store = AppointmentService::new(db.connection());
    let catalog = ResourceService::new(db.connection());
    SchedulingGrid::from_catalog(store, &catalog, &GridSettings::default(), grid_day())
        .expect("Failed to open grid")
}

fn center(grid: &SchedulingGrid<AppointmentService<'_>>, resource_id: i64, slot: SlotLabel) -> Pos2 {
    grid.layout(pos2(0.0, 0.0), Vec2::new(120.0, 24.0))
        .rect_for(CellRef::new(resource_id, slot))
        .expect("cell should be laid out")
        .center()
}

fn drag(
    grid: &mut SchedulingGrid<AppointmentService<'_>>,
    appointment_id: i64,
    from: (i64, SlotLabel),
    to: (i64, SlotLabel),
) -> DragOutcome {
    let layout = grid.layout(pos2(0.0, 0.0), Vec2::new(120.0, 24.0));
    let press = center(grid, from.0, from.1);
    let target = center(grid, to.0, to.1);

    assert!(grid.on_pointer_down(appointment_id, press, PointerKind::Mouse));
    grid.on_pointer_move(target, &layout);
    grid.on_pointer_up().expect("a drag was active")
}

#[test]
fn test_settings_persistence() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test_integration.db");
    let db_path = db_path.to_str().unwrap();

    {
        let db = Database::new(db_path).expect("Failed to create database");
        db.initialize_schema().expect("Failed to initialize schema");
        let settings_service = SettingsService::new(&db);

        let mut settings = settings_service.get().expect("Failed to get settings");
        assert_eq!(settings, GridSettings { id: Some(1), ..GridSettings::default() });

        settings.day_start_hour = 8;
        settings.day_end_hour = 20;
        settings.slot_minutes = 15;
        settings.resource_category = ResourceCategory::Room;
        settings_service.update(&settings).expect("Failed to update settings");
    }

    // Reopen and check the values survived
    let db = Database::new(db_path).expect("Failed to reopen database");
    db.initialize_schema().expect("Failed to initialize schema");
    let settings = SettingsService::new(&db).get().expect("Failed to get settings");
    assert_eq!(settings.day_start_hour, 8);
    assert_eq!(settings.day_end_hour, 20);
    assert_eq!(settings.slot_minutes, 15);
    assert_eq!(settings.resource_category, ResourceCategory::Room);
    assert_eq!(settings.time_grid().generate_slots().len(), 49);
}

#[test]
fn test_grid_shows_only_configured_category() {
    let db = memory_db();
    let (r1, r2, room) = seed_resources(&db);
    book(&db, room.id, "Room hire", at(10, 0), at(11, 0));

    let grid = open_grid(&db);
    let names: Vec<&str> = grid.resources().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["R1", "R2"]);
    assert_eq!(grid.resources()[0].id, r1.id);
    assert_eq!(grid.resources()[1].id, r2.id);
    assert!(grid.appointments().is_empty());
}

#[test]
fn test_reschedule_scenario() {
    let db = memory_db();
    let (r1, r2, _) = seed_resources(&db);
    let a = book(&db, r1.id, "A", at(14, 0), at(15, 0));
    let b = book(&db, r1.id, "B", at(9, 0), at(10, 0));
    let mut grid = open_grid(&db);

    // Rendering: both blocks anchored on R1, spanning two rows each
    let a_cell = grid.cell(r1.id, SlotLabel::new(14, 0));
    assert_eq!(a_cell.appointment_id, Some(a.id));
    assert!(a_cell.is_span_start);
    assert_eq!(a_cell.span, 2);
    assert_eq!(grid.cell(r1.id, SlotLabel::new(9, 30)).appointment_id, Some(b.id));

    // Validation alone is side-effect free
    let rejected = grid.validate_move(b.id, at(14, 30), at(15, 30), r1.id);
    assert_eq!(rejected.reason_text().as_deref(), Some("overlaps existing appointment"));
    assert!(grid.validate_move(b.id, at(14, 30), at(15, 30), r2.id).is_valid());

    // Dropping B onto A's column is refused and nothing is written
    let outcome = drag(
        &mut grid,
        b.id,
        (r1.id, SlotLabel::new(9, 0)),
        (r1.id, SlotLabel::new(14, 30)),
    );
    assert!(matches!(outcome, DragOutcome::Rejected(_)));
    let store = AppointmentService::new(db.connection());
    assert_eq!(store.get(b.id).unwrap().unwrap().start, at(9, 0));

    // Dropping B onto R2 at 14:30 commits
    let outcome = drag(
        &mut grid,
        b.id,
        (r1.id, SlotLabel::new(9, 0)),
        (r2.id, SlotLabel::new(14, 30)),
    );
    let DragOutcome::Committed(moved) = outcome else {
        panic!("expected commit, got {:?}", outcome);
    };
    assert_eq!(moved.resource_id, r2.id);
    assert_eq!(moved.start, at(14, 30));
    assert_eq!(moved.end, at(15, 30));
    assert_eq!(grid.drag_phase(), DragPhase::Idle);

    let stored = store.get(b.id).unwrap().unwrap();
    assert_eq!(stored.resource_id, r2.id);
    assert_eq!(stored.start, at(14, 30));
    assert_eq!(grid.cell(r2.id, SlotLabel::new(15, 0)).appointment_id, Some(b.id));
    assert_eq!(grid.cell(r1.id, SlotLabel::new(9, 0)).appointment_id, None);

    let events = grid.take_events();
    assert!(events.contains(&GridEvent::DragCommitted {
        appointment_id: b.id,
        outcome: CommitOutcome::Success,
    }));
}

#[test]
fn test_drop_on_origin_leaves_store_untouched() {
    let db = memory_db();
    let (r1, _, _) = seed_resources(&db);
    let a = book(&db, r1.id, "A", at(11, 0), at(12, 0));
    let mut grid = open_grid(&db);

    let outcome = drag(
        &mut grid,
        a.id,
        (r1.id, SlotLabel::new(11, 0)),
        (r1.id, SlotLabel::new(11, 0)),
    );
    assert!(matches!(outcome, DragOutcome::Unchanged));

    let stored = AppointmentService::new(db.connection()).get(a.id).unwrap().unwrap();
    assert_eq!(stored, a);
}

#[test]
fn test_stale_view_is_caught_by_store() {
    let db = memory_db();
    let (r1, r2, _) = seed_resources(&db);
    let a = book(&db, r2.id, "A", at(10, 0), at(11, 0));
    let mut stale = open_grid(&db);

    // Another writer books R1 at 13:00 after the grid loaded
    let late = book(&db, r1.id, "Late", at(13, 0), at(14, 0));

    let outcome = drag(
        &mut stale,
        a.id,
        (r2.id, SlotLabel::new(10, 0)),
        (r1.id, SlotLabel::new(13, 0)),
    );
    match outcome {
        DragOutcome::Failed(StoreError::Conflict { conflicting_id }) => {
            assert_eq!(conflicting_id, late.id)
        }
        other => panic!("expected store conflict, got {:?}", other),
    }

    // The failed commit re-fetched the day
    assert_eq!(stale.cell(r1.id, SlotLabel::new(13, 0)).appointment_id, Some(late.id));
    assert_eq!(stale.appointment(a.id).unwrap().resource_id, r2.id);
    assert_eq!(stale.drag_phase(), DragPhase::Idle);
}

#[test]
fn test_cancellation_is_non_destructive() {
    let db = memory_db();
    let (r1, _, _) = seed_resources(&db);
    let a = book(&db, r1.id, "A", at(10, 0), at(11, 30));
    let mut grid = open_grid(&db);

    grid.cancel_appointment(a.id).expect("cancel should succeed");
    assert!(grid.cell(r1.id, SlotLabel::new(10, 0)).muted);

    // A fresh grid still lists it, cancelled, with its original interval
    let reopened = open_grid(&db);
    let cancelled = reopened.appointment(a.id).expect("cancelled appointment is kept");
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
    assert_eq!(cancelled.start, at(10, 0));
    assert_eq!(cancelled.end, at(11, 30));
    assert_eq!(reopened.cell(r1.id, SlotLabel::new(10, 0)).span, 3);

    // Its slot is free for a new booking
    let mut grid = reopened;
    let request = NewAppointment::builder()
        .resource(r1.id)
        .title("Replacement")
        .start(at(10, 0))
        .end(at(11, 0))
        .build()
        .unwrap();
    let replacement = grid.create_appointment(request).expect("slot is free");
    assert_eq!(
        grid.cell(r1.id, SlotLabel::new(10, 0)).appointment_id,
        Some(replacement.id)
    );
}

#[test]
fn test_cancel_unknown_appointment_reports_store_error() {
    let db = memory_db();
    seed_resources(&db);
    let mut grid = open_grid(&db);

    let err = grid.cancel_appointment(404).unwrap_err();
    assert_eq!(err.to_string(), "appointment 404 not found");
    assert!(grid.take_events().contains(&GridEvent::CancelCommitted {
        appointment_id: 404,
        outcome: CommitOutcome::failure("appointment 404 not found"),
    }));
}

#[test]
fn test_select_date_loads_that_day_only() {
    let db = memory_db();
    let (r1, _, _) = seed_resources(&db);
    book(&db, r1.id, "Today", at(9, 0), at(9, 30));
    let tomorrow = book(&db, r1.id, "Tomorrow", on(next_day(), 9, 0), on(next_day(), 9, 30));
    let mut grid = open_grid(&db);
    assert_eq!(grid.appointments().len(), 1);

    grid.select_date(next_day()).unwrap();
    assert_eq!(grid.selected_date(), next_day());
    let ids: Vec<i64> = grid.appointments().iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![tomorrow.id]);

    let store = AppointmentService::new(db.connection());
    assert_eq!(store.list_appointments_for_date(grid_day()).unwrap().len(), 1);
}
