//! Shared test utilities.
//!
//! Common setup and fixture builders used across test modules.

#![cfg(test)]

use crate::db::{migrations, Database};
use crate::models::{Routine, ScheduleEntry};
use crate::recurrence::WeekdaySet;
use chrono::NaiveDate;
use tempfile::{tempdir, TempDir};

/// Create a temporary test database with migrations applied.
///
/// Returns a tuple of (Database, TempDir). The TempDir must be kept alive
/// for the duration of the test to prevent the database file from being deleted.
pub fn setup_test_db() -> (Database, TempDir) {
    let dir = tempdir().expect("Failed to create temp directory for test DB");
    let db_path = dir.path().join("test.db");
    let db = Database::open(&db_path).expect("Failed to open test database");
    migrations::run(db.connection()).expect("Failed to run migrations on test DB");
    (db, dir)
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// An unsaved routine: 09:00-10:00, category 1, the given weekday codes.
pub fn sample_routine(workspace_id: i64, owner_id: i64, codes: &[u8]) -> Routine {
    Routine {
        id: None,
        workspace_id,
        owner_id,
        title: "Morning focus".to_string(),
        start_time: "09:00".to_string(),
        end_time: Some("10:00".to_string()),
        summary: None,
        notes: None,
        days: WeekdaySet::from_codes(codes),
        category_id: 1,
        active: true,
    }
}

/// An unsaved bare schedule entry on the given date.
pub fn sample_entry(workspace_id: i64, owner_id: i64, date: NaiveDate) -> ScheduleEntry {
    ScheduleEntry {
        id: None,
        workspace_id,
        owner_id,
        date,
        start_time: None,
        end_time: None,
        summary: Some("entry".to_string()),
        notes: None,
        checked: false,
        category_id: None,
        routine_id: None,
        created_at: None,
    }
}
