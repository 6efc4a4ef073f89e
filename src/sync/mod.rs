//! Task/entry consistency: the one-directional check-state propagator
//! and the task-to-entry promoter.

use crate::error::AppError;
use crate::models::{ScheduleEntry, Task};
use chrono::NaiveDate;
use rusqlite::Connection;

/// Set a schedule entry's checked flag and mirror it onto every task
/// linked to that entry for the same owner.
///
/// Propagation runs this direction only. Completing a task directly
/// (`Task::set_completed`) never writes back to the entry.
pub fn set_entry_checked(
    conn: &Connection,
    entry_id: i64,
    workspace_id: i64,
    owner_id: i64,
    checked: bool,
) -> Result<(), AppError> {
    let updated = ScheduleEntry::set_checked(conn, entry_id, workspace_id, owner_id, checked)?;
    if !updated {
        return Err(AppError::NotFound {
            entity: "schedule entry",
        });
    }

    let touched = Task::complete_for_entry(conn, entry_id, owner_id, checked)?;
    if touched > 0 {
        log::debug!("propagated checked={checked} from entry {entry_id} to {touched} task(s)");
    }
    Ok(())
}

/// Promote a task into a one-off schedule entry on `date` and link the
/// two bidirectionally.
///
/// Only unlinked tasks can be promoted; the new entry starts unchecked,
/// so the task's completed flag is reset to match it. One transaction.
#[allow(clippy::too_many_arguments, reason = "the operation's full caller contract")]
pub fn promote_task(
    conn: &Connection,
    task_id: i64,
    workspace_id: i64,
    owner_id: i64,
    date: NaiveDate,
    start_time: Option<String>,
    end_time: Option<String>,
    category_id: Option<i64>,
) -> Result<ScheduleEntry, AppError> {
    let task = Task::find_by_id(conn, task_id, workspace_id, owner_id)?
        .ok_or(AppError::NotFound { entity: "task" })?;

    if task.schedule_entry_id.is_some() {
        return Err(AppError::AlreadyLinked);
    }

    let tx = conn.unchecked_transaction()?;

    let mut entry = ScheduleEntry {
        id: None,
        workspace_id,
        owner_id,
        date,
        start_time,
        end_time,
        summary: Some(task.summary.clone()),
        notes: task.notes.clone(),
        checked: false,
        category_id,
        routine_id: None,
        created_at: None,
    };
    entry.save(&tx)?;

    let entry_id = entry.id.ok_or_else(|| {
        AppError::Internal("schedule entry insert returned no id".to_string())
    })?;
    Task::link_entry(&tx, task_id, workspace_id, owner_id, entry_id, entry.checked)?;

    tx.commit()?;
    log::info!("promoted task {task_id} to schedule entry {entry_id} on {date}");
    Ok(entry)
}
