use crate::recurrence::WeekdaySet;
use rusqlite::{params, Connection, Result, Row};

/// A weekly recurrence template: a time window, a weekday set, and the
/// metadata copied onto every entry it materializes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routine {
    pub id: Option<i64>,
    pub workspace_id: i64,
    pub owner_id: i64,
    pub title: String,
    /// Start time in HH:MM format (24-hour). Always present.
    pub start_time: String,
    /// End time in HH:MM format, if the routine has a bounded window.
    pub end_time: Option<String>,
    pub summary: Option<String>,
    pub notes: Option<String>,
    pub days: WeekdaySet,
    /// May dangle after the category is deleted.
    pub category_id: i64,
    pub active: bool,
}

impl Routine {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            workspace_id: row.get(1)?,
            owner_id: row.get(2)?,
            title: row.get(3)?,
            start_time: row.get(4)?,
            end_time: row.get(5)?,
            summary: row.get(6)?,
            notes: row.get(7)?,
            days: WeekdaySet::parse_lossy(&row.get::<_, String>(8)?),
            category_id: row.get(9)?,
            active: row.get::<_, i32>(10)? != 0,
        })
    }

    /// Save a new routine to the database.
    pub fn save(&mut self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO routines (workspace_id, owner_id, title, start_time, end_time,
                                   summary, notes, days_of_week, category_id, active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                self.workspace_id,
                self.owner_id,
                self.title,
                self.start_time,
                self.end_time,
                self.summary,
                self.notes,
                self.days.to_storage(),
                self.category_id,
                i32::from(self.active),
            ],
        )?;
        self.id = Some(conn.last_insert_rowid());
        Ok(())
    }

    /// Update an existing routine in place. Scoped to its owner.
    pub fn update(&self, conn: &Connection) -> Result<bool> {
        let id = self.id.ok_or_else(|| {
            rusqlite::Error::InvalidParameterName("Cannot update unsaved routine".to_string())
        })?;

        let rows_affected = conn.execute(
            "UPDATE routines
             SET title = ?1, start_time = ?2, end_time = ?3, summary = ?4, notes = ?5,
                 days_of_week = ?6, category_id = ?7, active = ?8
             WHERE id = ?9 AND workspace_id = ?10 AND owner_id = ?11",
            params![
                self.title,
                self.start_time,
                self.end_time,
                self.summary,
                self.notes,
                self.days.to_storage(),
                self.category_id,
                i32::from(self.active),
                id,
                self.workspace_id,
                self.owner_id,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    pub fn find_by_id(
        conn: &Connection,
        id: i64,
        workspace_id: i64,
        owner_id: i64,
    ) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, workspace_id, owner_id, title, start_time, end_time,
                    summary, notes, days_of_week, category_id, active
             FROM routines WHERE id = ?1 AND workspace_id = ?2 AND owner_id = ?3",
        )?;
        let mut rows = stmt.query(params![id, workspace_id, owner_id])?;

        if let Some(row) = rows.next()? {
            Ok(Some(Self::from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn find_all(conn: &Connection, workspace_id: i64, owner_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, workspace_id, owner_id, title, start_time, end_time,
                    summary, notes, days_of_week, category_id, active
             FROM routines WHERE workspace_id = ?1 AND owner_id = ?2
             ORDER BY start_time, title",
        )?;
        let rows = stmt.query_map(params![workspace_id, owner_id], |row| Self::from_row(row))?;
        rows.collect()
    }

    /// Delete the routine row only. Materialized entries are the
    /// materializer's concern (`materialize::delete_routine`).
    pub fn delete(conn: &Connection, id: i64, workspace_id: i64, owner_id: i64) -> Result<bool> {
        let rows_affected = conn.execute(
            "DELETE FROM routines WHERE id = ?1 AND workspace_id = ?2 AND owner_id = ?3",
            params![id, workspace_id, owner_id],
        )?;
        Ok(rows_affected > 0)
    }
}
