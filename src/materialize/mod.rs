//! Materialization coordinator: drives the recurrence expander's output
//! into batch writes against the schedule-entry store.

use crate::constants::ROUTINE_MARKER;
use crate::error::AppError;
use crate::models::{Routine, ScheduleEntry};
use crate::recurrence::{self, month_bounds};
use chrono::NaiveDate;
use rusqlite::Connection;

/// Summary stamped onto materialized entries: the routine marker, plus
/// the routine's own summary when it has one.
fn marked_summary(routine: &Routine) -> String {
    match routine.summary.as_deref() {
        Some(summary) => format!("{ROUTINE_MARKER} {summary}"),
        None => ROUTINE_MARKER.to_string(),
    }
}

/// Materialize a routine over one month.
///
/// Builds one entry per expanded date and inserts the whole batch in a
/// single transaction. Returns the number of entries created. There is no
/// de-duplication: applying twice over overlapping windows duplicates
/// entries (see the tests that pin this down).
#[allow(clippy::too_many_arguments, reason = "the operation's full caller contract")]
pub fn apply(
    conn: &Connection,
    routine_id: i64,
    year: i32,
    month: u32,
    workspace_id: i64,
    owner_id: i64,
    include_past: bool,
    today: NaiveDate,
) -> Result<usize, AppError> {
    let routine = Routine::find_by_id(conn, routine_id, workspace_id, owner_id)?
        .ok_or(AppError::NotFound { entity: "routine" })?;

    let dates = recurrence::expand(&routine.days, year, month, include_past, today);
    if dates.is_empty() {
        log::debug!("apply: routine {routine_id} expands to no dates in {year}-{month:02}");
        return Ok(0);
    }

    let mut candidates: Vec<ScheduleEntry> = dates
        .into_iter()
        .map(|date| ScheduleEntry {
            id: None,
            workspace_id,
            owner_id,
            date,
            start_time: Some(routine.start_time.clone()),
            end_time: routine.end_time.clone(),
            summary: Some(marked_summary(&routine)),
            notes: routine.notes.clone(),
            checked: false,
            category_id: Some(routine.category_id),
            routine_id: Some(routine_id),
            created_at: None,
        })
        .collect();

    let created = ScheduleEntry::insert_batch(conn, &mut candidates)?;
    log::info!("apply: routine {routine_id} materialized {created} entries in {year}-{month:02}");
    Ok(created)
}

/// Retract a routine's materialized entries for one month.
///
/// The deletion window is always `[tomorrow, month_end]`. There is no
/// include-past variant: past and today's entries are never deleted,
/// whatever intent the caller expressed elsewhere. Returns the number
/// of entries deleted.
pub fn remove(
    conn: &Connection,
    routine_id: i64,
    year: i32,
    month: u32,
    workspace_id: i64,
    owner_id: i64,
    today: NaiveDate,
) -> Result<usize, AppError> {
    let Some((_, month_end)) = month_bounds(year, month) else {
        return Ok(0);
    };
    let Some(tomorrow) = today.succ_opt() else {
        return Ok(0);
    };
    if tomorrow > month_end {
        return Ok(0);
    }

    let deleted = ScheduleEntry::delete_for_routine_window(
        conn,
        routine_id,
        workspace_id,
        owner_id,
        tomorrow,
        month_end,
    )?;
    log::info!("remove: routine {routine_id} retracted {deleted} entries in {year}-{month:02}");
    Ok(deleted)
}

/// Delete a routine definition. Materialized entries survive across all
/// time; only their routine back-reference is cleared. One transaction.
pub fn delete_routine(
    conn: &Connection,
    routine_id: i64,
    workspace_id: i64,
    owner_id: i64,
) -> Result<bool, AppError> {
    let tx = conn.unchecked_transaction()?;
    let cleared = ScheduleEntry::clear_routine_refs(&tx, routine_id, workspace_id, owner_id)?;
    let deleted = Routine::delete(&tx, routine_id, workspace_id, owner_id)?;
    tx.commit()?;

    if deleted {
        log::info!("delete_routine: routine {routine_id} removed, {cleared} entries unlinked");
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::WeekdaySet;
    use crate::test_utils::{date, sample_routine, setup_test_db};
    use chrono::Datelike;

    fn saved_routine(conn: &Connection, codes: &[u8]) -> i64 {
        let mut routine = sample_routine(1, 10, codes);
        routine.save(conn).unwrap();
        routine.id.unwrap()
    }

    #[test]
    fn test_apply_creates_one_entry_per_expanded_date() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        let routine_id = saved_routine(conn, &[1]); // Mondays

        // January 2024 has five Mondays.
        let created = apply(conn, routine_id, 2024, 1, 1, 10, true, date(2024, 1, 10)).unwrap();
        assert_eq!(created, 5);

        let entries =
            ScheduleEntry::find_in_range(conn, 1, 10, date(2024, 1, 1), date(2024, 1, 31))
                .unwrap();
        assert_eq!(entries.len(), 5);
        for entry in &entries {
            assert_eq!(entry.routine_id, Some(routine_id));
            assert_eq!(entry.start_time.as_deref(), Some("09:00"));
            assert_eq!(entry.end_time.as_deref(), Some("10:00"));
            assert!(!entry.checked);
        }
    }

    #[test]
    fn test_apply_prefixes_summary_with_marker() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        let mut routine = sample_routine(1, 10, &[1]);
        routine.summary = Some("Morning run".to_string());
        routine.save(conn).unwrap();

        apply(conn, routine.id.unwrap(), 2024, 1, 1, 10, true, date(2024, 1, 1)).unwrap();
        let entries = ScheduleEntry::find_for_day(conn, 1, 10, date(2024, 1, 1)).unwrap();
        assert_eq!(entries[0].summary.as_deref(), Some("🔁 Morning run"));
    }

    #[test]
    fn test_apply_uses_bare_marker_without_summary() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        let mut routine = sample_routine(1, 10, &[1]);
        routine.summary = None;
        routine.save(conn).unwrap();

        apply(conn, routine.id.unwrap(), 2024, 1, 1, 10, true, date(2024, 1, 1)).unwrap();
        let entries = ScheduleEntry::find_for_day(conn, 1, 10, date(2024, 1, 1)).unwrap();
        assert_eq!(entries[0].summary.as_deref(), Some("🔁"));
    }

    #[test]
    fn test_apply_twice_duplicates_entries() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        let routine_id = saved_routine(conn, &[1]);

        let first = apply(conn, routine_id, 2024, 1, 1, 10, true, date(2024, 1, 10)).unwrap();
        let second = apply(conn, routine_id, 2024, 1, 1, 10, true, date(2024, 1, 10)).unwrap();
        assert_eq!(first, second);

        let entries =
            ScheduleEntry::find_in_range(conn, 1, 10, date(2024, 1, 1), date(2024, 1, 31))
                .unwrap();
        assert_eq!(entries.len(), first * 2);
    }

    #[test]
    fn test_apply_future_only_skips_past_dates() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        let routine_id = saved_routine(conn, &[1, 3, 5]);

        // Today is the 15th, a Tuesday (October 2024).
        let created =
            apply(conn, routine_id, 2024, 10, 1, 10, false, date(2024, 10, 15)).unwrap();
        assert_eq!(created, 7);

        let entries =
            ScheduleEntry::find_in_range(conn, 1, 10, date(2024, 10, 1), date(2024, 10, 31))
                .unwrap();
        let days: Vec<u32> = entries.iter().map(|e| e.date.day()).collect();
        assert_eq!(days, vec![16, 18, 21, 23, 25, 28, 30]);
    }

    #[test]
    fn test_apply_unknown_routine_is_rejected() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        let result = apply(conn, 999, 2024, 1, 1, 10, true, date(2024, 1, 1));
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[test]
    fn test_apply_other_owners_routine_is_rejected() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        let routine_id = saved_routine(conn, &[1]);

        let result = apply(conn, routine_id, 2024, 1, 1, 99, true, date(2024, 1, 1));
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[test]
    fn test_remove_never_deletes_today_or_earlier() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        let routine_id = saved_routine(conn, &[1, 2, 3, 4, 5, 6, 0]); // every day

        apply(conn, routine_id, 2024, 1, 1, 10, true, date(2024, 1, 1)).unwrap();

        let today = date(2024, 1, 15);
        let deleted = remove(conn, routine_id, 2024, 1, 1, 10, today).unwrap();
        assert_eq!(deleted, 16); // 16th through 31st

        let remaining =
            ScheduleEntry::find_in_range(conn, 1, 10, date(2024, 1, 1), date(2024, 1, 31))
                .unwrap();
        assert_eq!(remaining.len(), 15);
        assert!(remaining.iter().all(|e| e.date <= today));
    }

    #[test]
    fn test_remove_when_today_is_past_month_end_is_a_noop() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        let routine_id = saved_routine(conn, &[1]);

        apply(conn, routine_id, 2024, 1, 1, 10, true, date(2024, 1, 1)).unwrap();
        let deleted = remove(conn, routine_id, 2024, 1, 1, 10, date(2024, 2, 5)).unwrap();
        assert_eq!(deleted, 0);
    }

    #[test]
    fn test_remove_leaves_manual_entries_alone() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        let routine_id = saved_routine(conn, &[1]);

        apply(conn, routine_id, 2024, 1, 1, 10, true, date(2024, 1, 1)).unwrap();
        let mut manual = crate::test_utils::sample_entry(1, 10, date(2024, 1, 22));
        manual.save(conn).unwrap();

        remove(conn, routine_id, 2024, 1, 1, 10, date(2023, 12, 31)).unwrap();

        let remaining =
            ScheduleEntry::find_in_range(conn, 1, 10, date(2024, 1, 1), date(2024, 1, 31))
                .unwrap();
        assert_eq!(remaining.len(), 1);
        assert!(remaining[0].routine_id.is_none());
    }

    #[test]
    fn test_delete_routine_unlinks_entries_across_all_time() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        let routine_id = saved_routine(conn, &[1]);

        apply(conn, routine_id, 2024, 1, 1, 10, true, date(2024, 1, 10)).unwrap();
        apply(conn, routine_id, 2024, 2, 1, 10, true, date(2024, 1, 10)).unwrap();

        assert!(delete_routine(conn, routine_id, 1, 10).unwrap());
        assert!(Routine::find_by_id(conn, routine_id, 1, 10).unwrap().is_none());

        let entries =
            ScheduleEntry::find_in_range(conn, 1, 10, date(2024, 1, 1), date(2024, 2, 29))
                .unwrap();
        assert!(!entries.is_empty());
        assert!(entries.iter().all(|e| e.routine_id.is_none()));
    }

    #[test]
    fn test_apply_with_inactive_weekday_set_is_zero() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        let mut routine = sample_routine(1, 10, &[1]);
        routine.days = WeekdaySet::default();
        routine.save(conn).unwrap();

        // An empty weekday set cannot be created through validation, but a
        // stored routine with one still applies to zero dates.
        let created =
            apply(conn, routine.id.unwrap(), 2024, 1, 1, 10, true, date(2024, 1, 1)).unwrap();
        assert_eq!(created, 0);
    }
}
