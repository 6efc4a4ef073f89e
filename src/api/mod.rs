//! Caller-boundary operations: validation-first wrappers around the
//! stores and engines, speaking DTOs. The UI layer owns confirmation
//! prompts and navigation; it hands us a connection and a request.

mod dtos;

pub use dtos::*;

use crate::error::AppError;
use crate::materialize;
use crate::models::{Category, ReportMetric, Routine, ScheduleEntry, Task};
use crate::recurrence::WeekdaySet;
use crate::report;
use crate::sync;
use crate::validation::{
    validate_category_label, validate_month, validate_optional_time, validate_time_format,
    validate_title, validate_weekday_codes,
};
use chrono::{Local, NaiveDate};
use rusqlite::Connection;
use std::collections::HashMap;

fn category_labels(conn: &Connection, workspace_id: i64) -> Result<HashMap<i64, String>, AppError> {
    let labels = Category::find_all(conn, workspace_id)?
        .into_iter()
        .map(|c| (c.id, c.label))
        .collect();
    Ok(labels)
}

fn require_category(conn: &Connection, category_id: i64, workspace_id: i64) -> Result<(), AppError> {
    if Category::find_by_id(conn, category_id, workspace_id)?.is_none() {
        return Err(AppError::InvalidInput {
            field: "category_id",
            reason: "must reference an existing category".into(),
        });
    }
    Ok(())
}

// ── Categories ─────────────────────────────────────────────────────

pub fn list_categories(
    conn: &Connection,
    workspace_id: i64,
) -> Result<Vec<CategoryResponse>, AppError> {
    let categories = Category::find_all(conn, workspace_id)?;
    Ok(categories.into_iter().map(CategoryResponse::from).collect())
}

pub fn create_category(
    conn: &Connection,
    req: &CreateCategoryRequest,
) -> Result<CategoryResponse, AppError> {
    let label = validate_category_label(&req.label)?;
    let category = Category::create(conn, req.workspace_id, label)?;
    Ok(CategoryResponse::from(category))
}

pub fn update_category(
    conn: &Connection,
    id: i64,
    workspace_id: i64,
    label: &str,
) -> Result<(), AppError> {
    let label = validate_category_label(label)?;
    if !Category::update(conn, id, workspace_id, label)? {
        return Err(AppError::NotFound { entity: "category" });
    }
    Ok(())
}

/// Deleting a category leaves dangling references behind by design;
/// consumers render a placeholder label instead.
pub fn delete_category(conn: &Connection, id: i64, workspace_id: i64) -> Result<bool, AppError> {
    Ok(Category::delete(conn, id, workspace_id)?)
}

// ── Routines ───────────────────────────────────────────────────────

pub fn list_routines(
    conn: &Connection,
    workspace_id: i64,
    owner_id: i64,
) -> Result<Vec<RoutineResponse>, AppError> {
    let labels = category_labels(conn, workspace_id)?;
    let routines = Routine::find_all(conn, workspace_id, owner_id)?;
    Ok(routines
        .into_iter()
        .map(|r| RoutineResponse::from_routine(r, &labels))
        .collect())
}

pub fn create_routine(
    conn: &Connection,
    req: &CreateRoutineRequest,
) -> Result<RoutineResponse, AppError> {
    let title = validate_title(&req.title)?;
    validate_time_format(&req.start_time)?;
    validate_optional_time(req.end_time.as_deref())?;
    validate_weekday_codes(&req.weekdays)?;
    // Existence is only required at creation time; the reference may
    // dangle later if the category is deleted.
    require_category(conn, req.category_id, req.workspace_id)?;

    let mut routine = Routine {
        id: None,
        workspace_id: req.workspace_id,
        owner_id: req.owner_id,
        title: title.to_string(),
        start_time: req.start_time.clone(),
        end_time: req.end_time.clone(),
        summary: req.summary.clone(),
        notes: req.notes.clone(),
        days: WeekdaySet::from_codes(&req.weekdays),
        category_id: req.category_id,
        active: true,
    };
    routine.save(conn)?;

    let labels = category_labels(conn, req.workspace_id)?;
    Ok(RoutineResponse::from_routine(routine, &labels))
}

pub fn update_routine(conn: &Connection, req: &UpdateRoutineRequest) -> Result<(), AppError> {
    let title = validate_title(&req.title)?;
    validate_time_format(&req.start_time)?;
    validate_optional_time(req.end_time.as_deref())?;
    validate_weekday_codes(&req.weekdays)?;

    let routine = Routine {
        id: Some(req.id),
        workspace_id: req.workspace_id,
        owner_id: req.owner_id,
        title: title.to_string(),
        start_time: req.start_time.clone(),
        end_time: req.end_time.clone(),
        summary: req.summary.clone(),
        notes: req.notes.clone(),
        days: WeekdaySet::from_codes(&req.weekdays),
        category_id: req.category_id,
        active: req.active,
    };
    if !routine.update(conn)? {
        return Err(AppError::NotFound { entity: "routine" });
    }
    Ok(())
}

/// Delete a routine definition; its materialized entries survive with
/// the back-reference cleared.
pub fn delete_routine(
    conn: &Connection,
    routine_id: i64,
    workspace_id: i64,
    owner_id: i64,
) -> Result<(), AppError> {
    if !materialize::delete_routine(conn, routine_id, workspace_id, owner_id)? {
        return Err(AppError::NotFound { entity: "routine" });
    }
    Ok(())
}

/// Materialize a routine over a month. "Today" is resolved here, in the
/// caller's local calendar, and fixes the past/future boundary.
pub fn apply_routine(conn: &Connection, req: &ApplyRoutineRequest) -> Result<usize, AppError> {
    validate_month(req.month)?;
    let today = Local::now().date_naive();
    materialize::apply(
        conn,
        req.routine_id,
        req.year,
        req.month,
        req.workspace_id,
        req.owner_id,
        req.include_past,
        today,
    )
}

pub fn remove_routine(conn: &Connection, req: &RemoveRoutineRequest) -> Result<usize, AppError> {
    validate_month(req.month)?;
    let today = Local::now().date_naive();
    materialize::remove(
        conn,
        req.routine_id,
        req.year,
        req.month,
        req.workspace_id,
        req.owner_id,
        today,
    )
}

// ── Schedule entries ───────────────────────────────────────────────

pub fn entries_for_day(
    conn: &Connection,
    workspace_id: i64,
    owner_id: i64,
    date: NaiveDate,
) -> Result<Vec<ScheduleEntryResponse>, AppError> {
    let labels = category_labels(conn, workspace_id)?;
    let entries = ScheduleEntry::find_for_day(conn, workspace_id, owner_id, date)?;
    Ok(entries
        .into_iter()
        .map(|e| ScheduleEntryResponse::from_entry(e, &labels))
        .collect())
}

pub fn entries_in_range(
    conn: &Connection,
    workspace_id: i64,
    owner_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<ScheduleEntryResponse>, AppError> {
    let labels = category_labels(conn, workspace_id)?;
    let entries = ScheduleEntry::find_in_range(conn, workspace_id, owner_id, start, end)?;
    Ok(entries
        .into_iter()
        .map(|e| ScheduleEntryResponse::from_entry(e, &labels))
        .collect())
}

pub fn create_entry(
    conn: &Connection,
    req: &CreateEntryRequest,
) -> Result<ScheduleEntryResponse, AppError> {
    validate_optional_time(req.start_time.as_deref())?;
    validate_optional_time(req.end_time.as_deref())?;

    let mut entry = ScheduleEntry {
        id: None,
        workspace_id: req.workspace_id,
        owner_id: req.owner_id,
        date: req.date,
        start_time: req.start_time.clone(),
        end_time: req.end_time.clone(),
        summary: req.summary.clone(),
        notes: req.notes.clone(),
        checked: false,
        category_id: req.category_id,
        routine_id: None,
        created_at: None,
    };
    entry.save(conn)?;

    let labels = category_labels(conn, req.workspace_id)?;
    Ok(ScheduleEntryResponse::from_entry(entry, &labels))
}

/// Edit an entry. A change to the checked flag propagates to every task
/// linked to this entry; no other field does.
pub fn update_entry(conn: &Connection, req: &UpdateEntryRequest) -> Result<(), AppError> {
    validate_optional_time(req.start_time.as_deref())?;
    validate_optional_time(req.end_time.as_deref())?;

    let existing = ScheduleEntry::find_by_id(conn, req.id, req.workspace_id, req.owner_id)?
        .ok_or(AppError::NotFound {
            entity: "schedule entry",
        })?;
    let checked_changed = existing.checked != req.checked;

    let entry = ScheduleEntry {
        id: Some(req.id),
        workspace_id: req.workspace_id,
        owner_id: req.owner_id,
        date: req.date,
        start_time: req.start_time.clone(),
        end_time: req.end_time.clone(),
        summary: req.summary.clone(),
        notes: req.notes.clone(),
        checked: req.checked,
        category_id: req.category_id,
        routine_id: existing.routine_id,
        created_at: existing.created_at,
    };
    if !entry.update(conn)? {
        return Err(AppError::NotFound {
            entity: "schedule entry",
        });
    }

    if checked_changed {
        let touched = Task::complete_for_entry(conn, req.id, req.owner_id, req.checked)?;
        if touched > 0 {
            log::debug!(
                "entry {} checked -> {}, propagated to {touched} task(s)",
                req.id,
                req.checked
            );
        }
    }
    Ok(())
}

/// Toggle just the checked flag, with propagation.
pub fn set_entry_checked(
    conn: &Connection,
    entry_id: i64,
    workspace_id: i64,
    owner_id: i64,
    checked: bool,
) -> Result<(), AppError> {
    sync::set_entry_checked(conn, entry_id, workspace_id, owner_id, checked)
}

pub fn delete_entry(
    conn: &Connection,
    entry_id: i64,
    workspace_id: i64,
    owner_id: i64,
) -> Result<bool, AppError> {
    Ok(ScheduleEntry::delete(conn, entry_id, workspace_id, owner_id)?)
}

// ── Tasks ──────────────────────────────────────────────────────────

pub fn list_tasks(
    conn: &Connection,
    workspace_id: i64,
    owner_id: i64,
) -> Result<Vec<TaskResponse>, AppError> {
    let tasks = Task::find_all(conn, workspace_id, owner_id)?;
    Ok(tasks.into_iter().map(TaskResponse::from).collect())
}

pub fn create_task(conn: &Connection, req: &CreateTaskRequest) -> Result<TaskResponse, AppError> {
    let summary = req.summary.trim();
    if summary.is_empty() {
        return Err(AppError::InvalidInput {
            field: "summary",
            reason: "cannot be empty".into(),
        });
    }

    let mut task = Task::new(req.workspace_id, req.owner_id, summary, req.notes.as_deref());
    task.save(conn)?;
    Ok(TaskResponse::from(task))
}

/// Direct task edits, including the completed flag. Deliberately does
/// not write back to any linked schedule entry.
pub fn update_task(conn: &Connection, req: &UpdateTaskRequest) -> Result<(), AppError> {
    let existing = Task::find_by_id(conn, req.id, req.workspace_id, req.owner_id)?
        .ok_or(AppError::NotFound { entity: "task" })?;

    let task = Task {
        summary: req.summary.clone(),
        notes: req.notes.clone(),
        completed: req.completed,
        ..existing
    };
    if !task.update(conn)? {
        return Err(AppError::NotFound { entity: "task" });
    }
    Ok(())
}

pub fn set_task_completed(
    conn: &Connection,
    task_id: i64,
    workspace_id: i64,
    owner_id: i64,
    completed: bool,
) -> Result<(), AppError> {
    if !Task::set_completed(conn, task_id, workspace_id, owner_id, completed)? {
        return Err(AppError::NotFound { entity: "task" });
    }
    Ok(())
}

pub fn set_task_pinned(
    conn: &Connection,
    task_id: i64,
    workspace_id: i64,
    owner_id: i64,
    pinned: bool,
) -> Result<(), AppError> {
    if !Task::set_pinned(conn, task_id, workspace_id, owner_id, pinned)? {
        return Err(AppError::NotFound { entity: "task" });
    }
    Ok(())
}

pub fn move_task_to_top(
    conn: &Connection,
    task_id: i64,
    workspace_id: i64,
    owner_id: i64,
) -> Result<(), AppError> {
    if !Task::move_to_top(conn, task_id, workspace_id, owner_id)? {
        return Err(AppError::NotFound { entity: "task" });
    }
    Ok(())
}

/// Deleting a task never cascades to a linked schedule entry.
pub fn delete_task(
    conn: &Connection,
    task_id: i64,
    workspace_id: i64,
    owner_id: i64,
) -> Result<bool, AppError> {
    Ok(Task::delete(conn, task_id, workspace_id, owner_id)?)
}

pub fn promote_task(
    conn: &Connection,
    req: &PromoteTaskRequest,
) -> Result<ScheduleEntryResponse, AppError> {
    validate_optional_time(req.start_time.as_deref())?;
    validate_optional_time(req.end_time.as_deref())?;

    let entry = sync::promote_task(
        conn,
        req.task_id,
        req.workspace_id,
        req.owner_id,
        req.date,
        req.start_time.clone(),
        req.end_time.clone(),
        req.category_id,
    )?;

    let labels = category_labels(conn, req.workspace_id)?;
    Ok(ScheduleEntryResponse::from_entry(entry, &labels))
}

// ── Reports ────────────────────────────────────────────────────────

/// Aggregate a period and replace the report's stored metric set.
///
/// An empty result surfaces as `NoAnalyzableData` and leaves any
/// previously stored metrics untouched.
pub fn generate_report(
    conn: &Connection,
    req: &GenerateReportRequest,
) -> Result<Vec<MetricResponse>, AppError> {
    if req.end_date < req.start_date {
        return Err(AppError::InvalidInput {
            field: "end_date",
            reason: "must not be earlier than start_date".into(),
        });
    }

    let known = Category::ids(conn, req.workspace_id)?;
    let metrics = report::aggregate(
        conn,
        req.workspace_id,
        req.owner_id,
        req.start_date,
        req.end_date,
        &known,
    )?;
    if metrics.is_empty() {
        return Err(AppError::NoAnalyzableData);
    }

    report::replace_metrics(conn, req.report_id, &metrics)?;

    let labels = category_labels(conn, req.workspace_id)?;
    Ok(metrics
        .iter()
        .map(|m| MetricResponse::from_metric(m, &labels))
        .collect())
}

pub fn report_metrics(
    conn: &Connection,
    report_id: i64,
    workspace_id: i64,
) -> Result<Vec<MetricResponse>, AppError> {
    let labels = category_labels(conn, workspace_id)?;
    let stored = ReportMetric::find_for_report(conn, report_id)?;
    Ok(stored
        .iter()
        .map(|m| MetricResponse::from_stored(m, &labels))
        .collect())
}
