// src/api/dtos.rs

use crate::constants::DELETED_CATEGORY_LABEL;
use crate::models::{Category, ReportMetric, Routine, ScheduleEntry, Task};
use crate::report::PeriodMetric;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Resolve a possibly-dangling category reference to a label. A missing
/// row renders as a placeholder, never an error.
pub(crate) fn resolve_label(
    category_id: Option<i64>,
    labels: &HashMap<i64, String>,
) -> Option<String> {
    category_id.map(|id| {
        labels
            .get(&id)
            .cloned()
            .unwrap_or_else(|| DELETED_CATEGORY_LABEL.to_string())
    })
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub workspace_id: i64,
    pub label: String,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            workspace_id: category.workspace_id,
            label: category.label,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RoutineResponse {
    pub id: i64,
    pub workspace_id: i64,
    pub owner_id: i64,
    pub title: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub summary: Option<String>,
    pub notes: Option<String>,
    pub weekdays: Vec<u8>,
    pub category_id: i64,
    pub category_label: Option<String>,
    pub active: bool,
}

impl RoutineResponse {
    pub(crate) fn from_routine(routine: Routine, labels: &HashMap<i64, String>) -> Self {
        let category_label = resolve_label(Some(routine.category_id), labels);
        Self {
            id: routine.id.unwrap_or(0),
            workspace_id: routine.workspace_id,
            owner_id: routine.owner_id,
            title: routine.title,
            start_time: routine.start_time,
            end_time: routine.end_time,
            summary: routine.summary,
            notes: routine.notes,
            weekdays: routine.days.codes(),
            category_id: routine.category_id,
            category_label,
            active: routine.active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScheduleEntryResponse {
    pub id: i64,
    pub workspace_id: i64,
    pub owner_id: i64,
    pub date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub summary: Option<String>,
    pub notes: Option<String>,
    pub checked: bool,
    pub category_id: Option<i64>,
    pub category_label: Option<String>,
    pub routine_id: Option<i64>,
    pub duration_minutes: i64,
}

impl ScheduleEntryResponse {
    pub(crate) fn from_entry(entry: ScheduleEntry, labels: &HashMap<i64, String>) -> Self {
        let duration_minutes = entry.duration_minutes();
        let category_label = resolve_label(entry.category_id, labels);
        Self {
            id: entry.id.unwrap_or(0),
            workspace_id: entry.workspace_id,
            owner_id: entry.owner_id,
            date: entry.date,
            start_time: entry.start_time,
            end_time: entry.end_time,
            summary: entry.summary,
            notes: entry.notes,
            checked: entry.checked,
            category_id: entry.category_id,
            category_label,
            routine_id: entry.routine_id,
            duration_minutes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: i64,
    pub workspace_id: i64,
    pub owner_id: i64,
    pub summary: String,
    pub notes: Option<String>,
    pub completed: bool,
    pub pinned: bool,
    pub schedule_entry_id: Option<i64>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id.unwrap_or(0),
            workspace_id: task.workspace_id,
            owner_id: task.owner_id,
            summary: task.summary,
            notes: task.notes,
            completed: task.completed,
            pinned: task.pinned,
            schedule_entry_id: task.schedule_entry_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricResponse {
    pub category_id: Option<i64>,
    pub category_label: Option<String>,
    pub total_minutes: i64,
    pub completion_rate: i64,
}

impl MetricResponse {
    pub(crate) fn from_metric(metric: &PeriodMetric, labels: &HashMap<i64, String>) -> Self {
        Self {
            category_id: metric.category_id,
            category_label: resolve_label(metric.category_id, labels),
            total_minutes: metric.total_minutes,
            completion_rate: metric.completion_rate,
        }
    }

    pub(crate) fn from_stored(metric: &ReportMetric, labels: &HashMap<i64, String>) -> Self {
        Self {
            category_id: metric.category_id,
            category_label: resolve_label(metric.category_id, labels),
            total_minutes: metric.total_minutes,
            completion_rate: metric.completion_rate,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub workspace_id: i64,
    pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateRoutineRequest {
    pub workspace_id: i64,
    pub owner_id: i64,
    pub title: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub summary: Option<String>,
    pub notes: Option<String>,
    pub weekdays: Vec<u8>,
    pub category_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoutineRequest {
    pub id: i64,
    pub workspace_id: i64,
    pub owner_id: i64,
    pub title: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub summary: Option<String>,
    pub notes: Option<String>,
    pub weekdays: Vec<u8>,
    pub category_id: i64,
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct ApplyRoutineRequest {
    pub routine_id: i64,
    pub year: i32,
    pub month: u32,
    pub workspace_id: i64,
    pub owner_id: i64,
    pub include_past: bool,
}

/// Retraction has no include-past switch: the deletion window always
/// starts at tomorrow (see `materialize::remove`).
#[derive(Debug, Deserialize)]
pub struct RemoveRoutineRequest {
    pub routine_id: i64,
    pub year: i32,
    pub month: u32,
    pub workspace_id: i64,
    pub owner_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub workspace_id: i64,
    pub owner_id: i64,
    pub date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub summary: Option<String>,
    pub notes: Option<String>,
    pub category_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEntryRequest {
    pub id: i64,
    pub workspace_id: i64,
    pub owner_id: i64,
    pub date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub summary: Option<String>,
    pub notes: Option<String>,
    pub checked: bool,
    pub category_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub workspace_id: i64,
    pub owner_id: i64,
    pub summary: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub id: i64,
    pub workspace_id: i64,
    pub owner_id: i64,
    pub summary: String,
    pub notes: Option<String>,
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct PromoteTaskRequest {
    pub task_id: i64,
    pub workspace_id: i64,
    pub owner_id: i64,
    pub date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub category_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateReportRequest {
    pub report_id: i64,
    pub workspace_id: i64,
    pub owner_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}
