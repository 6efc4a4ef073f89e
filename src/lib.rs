//! Core engine of the Tempo planner: weekly routines materialized into
//! dated schedule entries, task/entry check-state consistency, and
//! per-category period aggregation for weekly reports.

pub mod api;
pub mod constants;
pub mod db;
pub mod error;
pub mod materialize;
pub mod models;
pub mod recurrence;
pub mod report;
pub mod sync;
#[cfg(test)]
mod test_utils;
pub mod validation;

use crate::error::AppError;
use directories::ProjectDirs;
use std::path::PathBuf;

/// Default on-disk location for the planner database.
pub fn default_db_path() -> Result<PathBuf, AppError> {
    let proj_dirs = ProjectDirs::from("com", "tempo", "Tempo")
        .ok_or_else(|| AppError::Internal("Could not determine project directories".to_string()))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;
    Ok(data_dir.join("tempo.db"))
}
