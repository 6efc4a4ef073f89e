use rusqlite::{params, Connection, Result};

/// A workspace-scoped tag. Routines and schedule entries reference
/// categories by plain id; deleting a category leaves those references
/// dangling on purpose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub workspace_id: i64,
    pub label: String,
}

impl Category {
    pub fn create(conn: &Connection, workspace_id: i64, label: &str) -> Result<Self> {
        conn.execute(
            "INSERT INTO categories (workspace_id, label) VALUES (?1, ?2)",
            params![workspace_id, label],
        )?;
        let id = conn.last_insert_rowid();
        Ok(Self {
            id,
            workspace_id,
            label: label.to_string(),
        })
    }

    pub fn find_by_id(conn: &Connection, id: i64, workspace_id: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, workspace_id, label FROM categories WHERE id = ?1 AND workspace_id = ?2",
        )?;
        let mut rows = stmt.query(params![id, workspace_id])?;

        if let Some(row) = rows.next()? {
            Ok(Some(Self {
                id: row.get(0)?,
                workspace_id: row.get(1)?,
                label: row.get(2)?,
            }))
        } else {
            Ok(None)
        }
    }

    pub fn find_all(conn: &Connection, workspace_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, workspace_id, label FROM categories WHERE workspace_id = ?1 ORDER BY label",
        )?;
        let rows = stmt.query_map(params![workspace_id], |row| {
            Ok(Self {
                id: row.get(0)?,
                workspace_id: row.get(1)?,
                label: row.get(2)?,
            })
        })?;

        rows.collect()
    }

    /// Ids of every category in the workspace; the aggregator's "known" set.
    pub fn ids(conn: &Connection, workspace_id: i64) -> Result<Vec<i64>> {
        let mut stmt = conn.prepare("SELECT id FROM categories WHERE workspace_id = ?1")?;
        let rows = stmt.query_map(params![workspace_id], |row| row.get(0))?;
        rows.collect()
    }

    pub fn update(conn: &Connection, id: i64, workspace_id: i64, label: &str) -> Result<bool> {
        let rows_affected = conn.execute(
            "UPDATE categories SET label = ?1 WHERE id = ?2 AND workspace_id = ?3",
            params![label, id, workspace_id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Delete a category. Referencing routines and entries are untouched.
    pub fn delete(conn: &Connection, id: i64, workspace_id: i64) -> Result<bool> {
        let rows_affected = conn.execute(
            "DELETE FROM categories WHERE id = ?1 AND workspace_id = ?2",
            params![id, workspace_id],
        )?;
        Ok(rows_affected > 0)
    }
}
