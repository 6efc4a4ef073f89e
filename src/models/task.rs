use rusqlite::{params, Connection, Result, Row};

/// A to-do item, optionally mirrored onto a calendar day through a
/// back-reference to one schedule entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: Option<i64>,
    pub workspace_id: i64,
    pub owner_id: i64,
    pub summary: String,
    pub notes: Option<String>,
    pub completed: bool,
    pub pinned: bool,
    pub pinned_at: Option<String>,
    pub moved_to_top_at: Option<String>,
    /// At most one entry is linked at a time; the promoter enforces it.
    pub schedule_entry_id: Option<i64>,
}

const COLUMNS: &str = "id, workspace_id, owner_id, summary, notes, completed, \
                       pinned, pinned_at, moved_to_top_at, schedule_entry_id";

impl Task {
    pub fn new(workspace_id: i64, owner_id: i64, summary: &str, notes: Option<&str>) -> Self {
        Self {
            id: None,
            workspace_id,
            owner_id,
            summary: summary.to_string(),
            notes: notes.map(str::to_string),
            completed: false,
            pinned: false,
            pinned_at: None,
            moved_to_top_at: None,
            schedule_entry_id: None,
        }
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            workspace_id: row.get(1)?,
            owner_id: row.get(2)?,
            summary: row.get(3)?,
            notes: row.get(4)?,
            completed: row.get::<_, i32>(5)? != 0,
            pinned: row.get::<_, i32>(6)? != 0,
            pinned_at: row.get(7)?,
            moved_to_top_at: row.get(8)?,
            schedule_entry_id: row.get(9)?,
        })
    }

    /// Save a new task to the database.
    pub fn save(&mut self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO tasks (workspace_id, owner_id, summary, notes, completed,
                                pinned, pinned_at, moved_to_top_at, schedule_entry_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                self.workspace_id,
                self.owner_id,
                self.summary,
                self.notes,
                i32::from(self.completed),
                i32::from(self.pinned),
                self.pinned_at,
                self.moved_to_top_at,
                self.schedule_entry_id,
            ],
        )?;
        self.id = Some(conn.last_insert_rowid());
        Ok(())
    }

    pub fn find_by_id(
        conn: &Connection,
        id: i64,
        workspace_id: i64,
        owner_id: i64,
    ) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM tasks WHERE id = ?1 AND workspace_id = ?2 AND owner_id = ?3"
        ))?;
        let mut rows = stmt.query(params![id, workspace_id, owner_id])?;

        if let Some(row) = rows.next()? {
            Ok(Some(Self::from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// All tasks for an owner, pinned first, most recently surfaced first.
    pub fn find_all(conn: &Connection, workspace_id: i64, owner_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE workspace_id = ?1 AND owner_id = ?2
             ORDER BY pinned DESC,
                      COALESCE(moved_to_top_at, pinned_at, '') DESC,
                      id DESC"
        ))?;
        let rows = stmt.query_map(params![workspace_id, owner_id], |row| Self::from_row(row))?;
        rows.collect()
    }

    /// Update the user-editable fields. Scoped to owner and workspace.
    pub fn update(&self, conn: &Connection) -> Result<bool> {
        let id = self.id.ok_or_else(|| {
            rusqlite::Error::InvalidParameterName("Cannot update unsaved task".to_string())
        })?;

        let rows_affected = conn.execute(
            "UPDATE tasks SET summary = ?1, notes = ?2, completed = ?3
             WHERE id = ?4 AND workspace_id = ?5 AND owner_id = ?6",
            params![
                self.summary,
                self.notes,
                i32::from(self.completed),
                id,
                self.workspace_id,
                self.owner_id,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    pub fn set_completed(
        conn: &Connection,
        id: i64,
        workspace_id: i64,
        owner_id: i64,
        completed: bool,
    ) -> Result<bool> {
        let rows_affected = conn.execute(
            "UPDATE tasks SET completed = ?1
             WHERE id = ?2 AND workspace_id = ?3 AND owner_id = ?4",
            params![i32::from(completed), id, workspace_id, owner_id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Pin or unpin, maintaining the pinned timestamp.
    pub fn set_pinned(
        conn: &Connection,
        id: i64,
        workspace_id: i64,
        owner_id: i64,
        pinned: bool,
    ) -> Result<bool> {
        let rows_affected = conn.execute(
            "UPDATE tasks
             SET pinned = ?1,
                 pinned_at = CASE WHEN ?1 THEN CURRENT_TIMESTAMP ELSE NULL END
             WHERE id = ?2 AND workspace_id = ?3 AND owner_id = ?4",
            params![i32::from(pinned), id, workspace_id, owner_id],
        )?;
        Ok(rows_affected > 0)
    }

    pub fn move_to_top(
        conn: &Connection,
        id: i64,
        workspace_id: i64,
        owner_id: i64,
    ) -> Result<bool> {
        let rows_affected = conn.execute(
            "UPDATE tasks SET moved_to_top_at = CURRENT_TIMESTAMP
             WHERE id = ?1 AND workspace_id = ?2 AND owner_id = ?3",
            params![id, workspace_id, owner_id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Link the task to a schedule entry and mirror that entry's checked
    /// state onto the completed flag. The promoter's second half.
    pub fn link_entry(
        conn: &Connection,
        id: i64,
        workspace_id: i64,
        owner_id: i64,
        entry_id: i64,
        completed: bool,
    ) -> Result<bool> {
        let rows_affected = conn.execute(
            "UPDATE tasks SET schedule_entry_id = ?1, completed = ?2
             WHERE id = ?3 AND workspace_id = ?4 AND owner_id = ?5",
            params![entry_id, i32::from(completed), id, workspace_id, owner_id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Set completed on every task whose back-reference points at the
    /// given entry, for one owner. The propagator's write path.
    pub fn complete_for_entry(
        conn: &Connection,
        entry_id: i64,
        owner_id: i64,
        completed: bool,
    ) -> Result<usize> {
        let rows_affected = conn.execute(
            "UPDATE tasks SET completed = ?1
             WHERE schedule_entry_id = ?2 AND owner_id = ?3",
            params![i32::from(completed), entry_id, owner_id],
        )?;
        Ok(rows_affected)
    }

    /// Delete a task. Any linked schedule entry survives untouched.
    pub fn delete(conn: &Connection, id: i64, workspace_id: i64, owner_id: i64) -> Result<bool> {
        let rows_affected = conn.execute(
            "DELETE FROM tasks WHERE id = ?1 AND workspace_id = ?2 AND owner_id = ?3",
            params![id, workspace_id, owner_id],
        )?;
        Ok(rows_affected > 0)
    }
}
