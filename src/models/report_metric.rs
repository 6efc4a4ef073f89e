use rusqlite::{params, Connection, Result};

/// A derived per-category metric row owned by a reporting period.
/// Regenerated wholesale by the period aggregator, never patched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportMetric {
    pub id: Option<i64>,
    pub report_id: i64,
    /// `None` groups uncategorized entries; a `Some` id may dangle.
    pub category_id: Option<i64>,
    pub total_minutes: i64,
    /// 0-100, rounded to the nearest integer.
    pub completion_rate: i64,
}

impl ReportMetric {
    pub fn find_for_report(conn: &Connection, report_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, report_id, category_id, total_minutes, completion_rate
             FROM report_metrics WHERE report_id = ?1
             ORDER BY category_id",
        )?;
        let rows = stmt.query_map(params![report_id], |row| {
            Ok(Self {
                id: Some(row.get(0)?),
                report_id: row.get(1)?,
                category_id: row.get(2)?,
                total_minutes: row.get(3)?,
                completion_rate: row.get(4)?,
            })
        })?;
        rows.collect()
    }

    /// Replace the report's whole metric set in one transaction.
    pub fn replace_for_report(
        conn: &Connection,
        report_id: i64,
        metrics: &[(Option<i64>, i64, i64)],
    ) -> Result<()> {
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM report_metrics WHERE report_id = ?1",
            params![report_id],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO report_metrics (report_id, category_id, total_minutes, completion_rate)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (category_id, total_minutes, completion_rate) in metrics {
                stmt.execute(params![report_id, category_id, total_minutes, completion_rate])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
