//! Period aggregation: roll schedule entries in a date range into
//! per-category duration and completion-rate metrics.

use crate::error::AppError;
use crate::models::{ReportMetric, ScheduleEntry};
use chrono::NaiveDate;
use rusqlite::Connection;
use std::collections::BTreeSet;

/// One computed metric row. `category_id == None` groups entries that
/// carry no category at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodMetric {
    pub category_id: Option<i64>,
    pub total_minutes: i64,
    /// 0-100, rounded to the nearest integer.
    pub completion_rate: i64,
}

/// Aggregate an owner's entries over `[start, end]` into per-category
/// metrics, ascending by category id with the uncategorized group first.
///
/// The working category set is the union of `known_category_ids` and every
/// category actually referenced by a fetched entry, so categories deleted
/// since the entries were written still get a row instead of silently
/// vanishing. Rows where both minutes and rate are zero are suppressed;
/// in particular a known category with no entries in range emits nothing.
pub fn aggregate(
    conn: &Connection,
    workspace_id: i64,
    owner_id: i64,
    start: NaiveDate,
    end: NaiveDate,
    known_category_ids: &[i64],
) -> Result<Vec<PeriodMetric>, AppError> {
    let entries = ScheduleEntry::find_in_range(conn, workspace_id, owner_id, start, end)?;

    let mut category_ids: BTreeSet<Option<i64>> =
        known_category_ids.iter().map(|&id| Some(id)).collect();
    for entry in &entries {
        category_ids.insert(entry.category_id);
    }

    let mut metrics = Vec::new();
    for category_id in category_ids {
        let group: Vec<&ScheduleEntry> = entries
            .iter()
            .filter(|e| e.category_id == category_id)
            .collect();

        let total_minutes: i64 = group.iter().map(|e| e.duration_minutes()).sum();
        let completion_rate = if group.is_empty() {
            0
        } else {
            let checked = group.iter().filter(|e| e.checked).count();
            rate_percent(checked, group.len())
        };

        if total_minutes == 0 && completion_rate == 0 {
            continue;
        }
        metrics.push(PeriodMetric {
            category_id,
            total_minutes,
            completion_rate,
        });
    }

    log::debug!(
        "aggregate: {} entries in [{start}, {end}] -> {} metric row(s)",
        entries.len(),
        metrics.len()
    );
    Ok(metrics)
}

/// Persist a computed metric list as a report's full metric set,
/// replacing whatever was stored before.
pub fn replace_metrics(
    conn: &Connection,
    report_id: i64,
    metrics: &[PeriodMetric],
) -> Result<(), AppError> {
    let rows: Vec<(Option<i64>, i64, i64)> = metrics
        .iter()
        .map(|m| (m.category_id, m.total_minutes, m.completion_rate))
        .collect();
    ReportMetric::replace_for_report(conn, report_id, &rows)?;
    Ok(())
}

/// `round(100 * checked / total)` as an integer percentage.
fn rate_percent(checked: usize, total: usize) -> i64 {
    let checked = i64::try_from(checked).unwrap_or(i64::MAX);
    let total = i64::try_from(total).unwrap_or(i64::MAX).max(1);
    // round half up, integer arithmetic
    (200 * checked + total) / (2 * total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{date, sample_entry, setup_test_db};

    fn add_entry(
        conn: &Connection,
        day: u32,
        times: Option<(&str, &str)>,
        checked: bool,
        category_id: Option<i64>,
    ) {
        let mut entry = sample_entry(1, 10, date(2024, 6, day));
        entry.start_time = times.map(|(s, _)| s.to_string());
        entry.end_time = times.map(|(_, e)| e.to_string());
        entry.checked = checked;
        entry.category_id = category_id;
        entry.save(conn).unwrap();
    }

    #[test]
    fn test_rate_percent_rounding() {
        assert_eq!(rate_percent(0, 3), 0);
        assert_eq!(rate_percent(1, 3), 33);
        assert_eq!(rate_percent(2, 3), 67);
        assert_eq!(rate_percent(3, 3), 100);
        assert_eq!(rate_percent(1, 2), 50);
        assert_eq!(rate_percent(1, 8), 13); // 12.5 rounds up
    }

    #[test]
    fn test_checked_timed_category_kept_zero_width_unchecked_suppressed() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        // Category A: 09:00-10:30, checked. Category B: zero width, unchecked.
        add_entry(conn, 3, Some(("09:00", "10:30")), true, Some(1));
        add_entry(conn, 4, Some(("14:00", "14:00")), false, Some(2));

        let metrics =
            aggregate(conn, 1, 10, date(2024, 6, 1), date(2024, 6, 30), &[1, 2]).unwrap();

        assert_eq!(
            metrics,
            vec![PeriodMetric {
                category_id: Some(1),
                total_minutes: 90,
                completion_rate: 100,
            }]
        );
    }

    #[test]
    fn test_known_category_without_entries_emits_no_row() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        add_entry(conn, 3, Some(("09:00", "10:00")), false, Some(1));

        let metrics =
            aggregate(conn, 1, 10, date(2024, 6, 1), date(2024, 6, 30), &[1, 7]).unwrap();
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].category_id, Some(1));
    }

    #[test]
    fn test_dangling_category_is_recovered_from_entries() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        // Category 55 is not in the known set (deleted), but an entry
        // still references it.
        add_entry(conn, 3, Some(("08:00", "09:00")), true, Some(55));

        let metrics = aggregate(conn, 1, 10, date(2024, 6, 1), date(2024, 6, 30), &[]).unwrap();
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].category_id, Some(55));
        assert_eq!(metrics[0].total_minutes, 60);
        assert_eq!(metrics[0].completion_rate, 100);
    }

    #[test]
    fn test_uncategorized_entries_group_under_none() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        add_entry(conn, 3, Some(("09:00", "09:45")), false, None);
        add_entry(conn, 4, None, true, None);

        let metrics = aggregate(conn, 1, 10, date(2024, 6, 1), date(2024, 6, 30), &[]).unwrap();
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].category_id, None);
        assert_eq!(metrics[0].total_minutes, 45);
        assert_eq!(metrics[0].completion_rate, 50);
    }

    #[test]
    fn test_all_zero_group_is_suppressed() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        // zero duration, unchecked
        add_entry(conn, 3, None, false, Some(1));
        add_entry(conn, 4, Some(("14:00", "14:00")), false, Some(1));

        let metrics = aggregate(conn, 1, 10, date(2024, 6, 1), date(2024, 6, 30), &[1]).unwrap();
        assert!(metrics.is_empty());
    }

    #[test]
    fn test_zero_minutes_but_nonzero_rate_is_kept() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        add_entry(conn, 3, None, true, Some(1));

        let metrics = aggregate(conn, 1, 10, date(2024, 6, 1), date(2024, 6, 30), &[1]).unwrap();
        assert_eq!(
            metrics,
            vec![PeriodMetric {
                category_id: Some(1),
                total_minutes: 0,
                completion_rate: 100,
            }]
        );
    }

    #[test]
    fn test_range_is_inclusive_on_both_ends() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        add_entry(conn, 1, Some(("09:00", "10:00")), false, Some(1));
        add_entry(conn, 30, Some(("09:00", "10:00")), false, Some(1));
        add_entry(conn, 15, Some(("09:00", "10:00")), false, Some(1));

        let metrics =
            aggregate(conn, 1, 10, date(2024, 6, 1), date(2024, 6, 30), &[1]).unwrap();
        assert_eq!(metrics[0].total_minutes, 180);
    }

    #[test]
    fn test_replace_metrics_persists_computed_set() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        add_entry(conn, 3, Some(("09:00", "10:30")), true, Some(1));
        let metrics =
            aggregate(conn, 1, 10, date(2024, 6, 1), date(2024, 6, 30), &[1]).unwrap();

        replace_metrics(conn, 5, &metrics).unwrap();
        let stored = ReportMetric::find_for_report(conn, 5).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].total_minutes, 90);
        assert_eq!(stored[0].completion_rate, 100);
    }
}
