use chrono::NaiveDate;
use rusqlite::{params, Connection, Result, Row};

/// One calendar-day occurrence: materialized from a routine, promoted
/// from a task, or created directly by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub id: Option<i64>,
    pub workspace_id: i64,
    pub owner_id: i64,
    /// Naive calendar date; no timezone is attached to stored dates.
    pub date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub summary: Option<String>,
    pub notes: Option<String>,
    pub checked: bool,
    /// May dangle after the category is deleted.
    pub category_id: Option<i64>,
    /// Set on routine-materialized entries; cleared when the routine goes.
    pub routine_id: Option<i64>,
    /// Defaulted by the database on insert.
    pub created_at: Option<String>,
}

const COLUMNS: &str = "id, workspace_id, owner_id, date, start_time, end_time, \
                       summary, notes, checked, category_id, routine_id, created_at";

impl ScheduleEntry {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            workspace_id: row.get(1)?,
            owner_id: row.get(2)?,
            date: row.get(3)?,
            start_time: row.get(4)?,
            end_time: row.get(5)?,
            summary: row.get(6)?,
            notes: row.get(7)?,
            checked: row.get::<_, i32>(8)? != 0,
            category_id: row.get(9)?,
            routine_id: row.get(10)?,
            created_at: row.get(11)?,
        })
    }

    fn insert(&mut self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO schedule_entries (workspace_id, owner_id, date, start_time, end_time,
                                           summary, notes, checked, category_id, routine_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                self.workspace_id,
                self.owner_id,
                self.date,
                self.start_time,
                self.end_time,
                self.summary,
                self.notes,
                i32::from(self.checked),
                self.category_id,
                self.routine_id,
            ],
        )?;
        self.id = Some(conn.last_insert_rowid());
        Ok(())
    }

    /// Save a new entry to the database.
    pub fn save(&mut self, conn: &Connection) -> Result<()> {
        self.insert(conn)
    }

    /// Insert a batch of entries inside a single transaction. Either every
    /// candidate lands or none do. Returns the inserted count.
    pub fn insert_batch(conn: &Connection, entries: &mut [Self]) -> Result<usize> {
        let tx = conn.unchecked_transaction()?;
        for entry in entries.iter_mut() {
            entry.insert(&tx)?;
        }
        tx.commit()?;
        Ok(entries.len())
    }

    pub fn find_by_id(
        conn: &Connection,
        id: i64,
        workspace_id: i64,
        owner_id: i64,
    ) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM schedule_entries
             WHERE id = ?1 AND workspace_id = ?2 AND owner_id = ?3"
        ))?;
        let mut rows = stmt.query(params![id, workspace_id, owner_id])?;

        if let Some(row) = rows.next()? {
            Ok(Some(Self::from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn find_for_day(
        conn: &Connection,
        workspace_id: i64,
        owner_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM schedule_entries
             WHERE workspace_id = ?1 AND owner_id = ?2 AND date = ?3
             ORDER BY start_time, id"
        ))?;
        let rows = stmt.query_map(params![workspace_id, owner_id, date], |row| {
            Self::from_row(row)
        })?;
        rows.collect()
    }

    /// Entries with `date` in `[start, end]`, both ends inclusive.
    pub fn find_in_range(
        conn: &Connection,
        workspace_id: i64,
        owner_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM schedule_entries
             WHERE workspace_id = ?1 AND owner_id = ?2 AND date >= ?3 AND date <= ?4
             ORDER BY date, start_time, id"
        ))?;
        let rows = stmt.query_map(params![workspace_id, owner_id, start, end], |row| {
            Self::from_row(row)
        })?;
        rows.collect()
    }

    /// Update every mutable field. Scoped to owner and workspace; the
    /// checked flag is included, so callers that care about check-state
    /// propagation must diff it first (see `sync`).
    pub fn update(&self, conn: &Connection) -> Result<bool> {
        let id = self.id.ok_or_else(|| {
            rusqlite::Error::InvalidParameterName("Cannot update unsaved entry".to_string())
        })?;

        let rows_affected = conn.execute(
            "UPDATE schedule_entries
             SET date = ?1, start_time = ?2, end_time = ?3, summary = ?4, notes = ?5,
                 checked = ?6, category_id = ?7
             WHERE id = ?8 AND workspace_id = ?9 AND owner_id = ?10",
            params![
                self.date,
                self.start_time,
                self.end_time,
                self.summary,
                self.notes,
                i32::from(self.checked),
                self.category_id,
                id,
                self.workspace_id,
                self.owner_id,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    pub fn set_checked(
        conn: &Connection,
        id: i64,
        workspace_id: i64,
        owner_id: i64,
        checked: bool,
    ) -> Result<bool> {
        let rows_affected = conn.execute(
            "UPDATE schedule_entries SET checked = ?1
             WHERE id = ?2 AND workspace_id = ?3 AND owner_id = ?4",
            params![i32::from(checked), id, workspace_id, owner_id],
        )?;
        Ok(rows_affected > 0)
    }

    pub fn delete(conn: &Connection, id: i64, workspace_id: i64, owner_id: i64) -> Result<bool> {
        let rows_affected = conn.execute(
            "DELETE FROM schedule_entries WHERE id = ?1 AND workspace_id = ?2 AND owner_id = ?3",
            params![id, workspace_id, owner_id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Bulk-delete the entries a routine materialized inside a date window,
    /// both ends inclusive. Returns the deleted count.
    pub fn delete_for_routine_window(
        conn: &Connection,
        routine_id: i64,
        workspace_id: i64,
        owner_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<usize> {
        let rows_affected = conn.execute(
            "DELETE FROM schedule_entries
             WHERE routine_id = ?1 AND workspace_id = ?2 AND owner_id = ?3
               AND date >= ?4 AND date <= ?5",
            params![routine_id, workspace_id, owner_id, from, to],
        )?;
        Ok(rows_affected)
    }

    /// Clear the routine back-reference on every entry that carries it,
    /// across all time. The entries themselves survive.
    pub fn clear_routine_refs(
        conn: &Connection,
        routine_id: i64,
        workspace_id: i64,
        owner_id: i64,
    ) -> Result<usize> {
        let rows_affected = conn.execute(
            "UPDATE schedule_entries SET routine_id = NULL
             WHERE routine_id = ?1 AND workspace_id = ?2 AND owner_id = ?3",
            params![routine_id, workspace_id, owner_id],
        )?;
        Ok(rows_affected)
    }

    /// Duration in minutes for metrics: `max(0, end - start)` when both
    /// times are present and parse, else 0.
    pub fn duration_minutes(&self) -> i64 {
        match (
            self.start_time.as_deref().and_then(minutes_of_day),
            self.end_time.as_deref().and_then(minutes_of_day),
        ) {
            (Some(start), Some(end)) => (end - start).max(0),
            _ => 0,
        }
    }
}

/// Minutes since midnight for an HH:MM string, or `None` if it does not parse.
fn minutes_of_day(time: &str) -> Option<i64> {
    let (hours, minutes) = time.split_once(':')?;
    let hours: i64 = hours.parse().ok()?;
    let minutes: i64 = minutes.parse().ok()?;
    Some(hours * 60 + minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{date, sample_entry, setup_test_db};

    #[test]
    fn test_save_assigns_id_and_created_at_defaults() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        let mut entry = sample_entry(1, 10, date(2024, 6, 3));
        entry.save(conn).unwrap();

        let found = ScheduleEntry::find_by_id(conn, entry.id.unwrap(), 1, 10)
            .unwrap()
            .unwrap();
        assert_eq!(found.date, date(2024, 6, 3));
        assert!(found.created_at.is_some());
        assert!(!found.checked);
    }

    #[test]
    fn test_multiple_entries_per_day_allowed() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        sample_entry(1, 10, date(2024, 6, 3)).save(conn).unwrap();
        sample_entry(1, 10, date(2024, 6, 3)).save(conn).unwrap();

        let found = ScheduleEntry::find_for_day(conn, 1, 10, date(2024, 6, 3)).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_find_in_range_is_inclusive_and_ordered() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        for day in [5, 1, 3, 9] {
            sample_entry(1, 10, date(2024, 6, day)).save(conn).unwrap();
        }

        let found = ScheduleEntry::find_in_range(conn, 1, 10, date(2024, 6, 1), date(2024, 6, 5))
            .unwrap();
        let days: Vec<u32> = found.iter().map(|e| chrono::Datelike::day(&e.date)).collect();
        assert_eq!(days, vec![1, 3, 5]);
    }

    #[test]
    fn test_insert_batch_counts() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        let mut entries = vec![
            sample_entry(1, 10, date(2024, 6, 3)),
            sample_entry(1, 10, date(2024, 6, 4)),
            sample_entry(1, 10, date(2024, 6, 5)),
        ];
        let count = ScheduleEntry::insert_batch(conn, &mut entries).unwrap();
        assert_eq!(count, 3);
        assert!(entries.iter().all(|e| e.id.is_some()));
    }

    #[test]
    fn test_set_checked_scoped_to_owner() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        let mut entry = sample_entry(1, 10, date(2024, 6, 3));
        entry.save(conn).unwrap();
        let id = entry.id.unwrap();

        assert!(!ScheduleEntry::set_checked(conn, id, 1, 99, true).unwrap());
        assert!(ScheduleEntry::set_checked(conn, id, 1, 10, true).unwrap());

        let found = ScheduleEntry::find_by_id(conn, id, 1, 10).unwrap().unwrap();
        assert!(found.checked);
    }

    #[test]
    fn test_delete_for_routine_window() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        for day in 1..=10 {
            let mut entry = sample_entry(1, 10, date(2024, 6, day));
            entry.routine_id = Some(7);
            entry.save(conn).unwrap();
        }
        // an unrelated manual entry in the same window
        sample_entry(1, 10, date(2024, 6, 5)).save(conn).unwrap();

        let deleted = ScheduleEntry::delete_for_routine_window(
            conn,
            7,
            1,
            10,
            date(2024, 6, 4),
            date(2024, 6, 8),
        )
        .unwrap();
        assert_eq!(deleted, 5);

        let remaining = ScheduleEntry::find_in_range(conn, 1, 10, date(2024, 6, 1), date(2024, 6, 30))
            .unwrap();
        assert_eq!(remaining.len(), 6);
    }

    #[test]
    fn test_clear_routine_refs_keeps_entries() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        let mut entry = sample_entry(1, 10, date(2024, 6, 3));
        entry.routine_id = Some(7);
        entry.save(conn).unwrap();

        let cleared = ScheduleEntry::clear_routine_refs(conn, 7, 1, 10).unwrap();
        assert_eq!(cleared, 1);

        let found = ScheduleEntry::find_by_id(conn, entry.id.unwrap(), 1, 10)
            .unwrap()
            .unwrap();
        assert!(found.routine_id.is_none());
    }

    #[test]
    fn test_duration_minutes() {
        let mut entry = sample_entry(1, 10, date(2024, 6, 3));

        entry.start_time = Some("09:00".to_string());
        entry.end_time = Some("10:30".to_string());
        assert_eq!(entry.duration_minutes(), 90);

        entry.end_time = Some("09:00".to_string());
        assert_eq!(entry.duration_minutes(), 0);

        // end before start clamps to zero
        entry.end_time = Some("08:00".to_string());
        assert_eq!(entry.duration_minutes(), 0);

        entry.end_time = None;
        assert_eq!(entry.duration_minutes(), 0);

        entry.start_time = None;
        assert_eq!(entry.duration_minutes(), 0);
    }
}
