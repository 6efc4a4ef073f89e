// src/constants.rs

/// Prefix stamped onto the summary of every routine-materialized entry.
pub const ROUTINE_MARKER: &str = "🔁";

/// Placeholder label shown when a referenced category row no longer exists.
pub const DELETED_CATEGORY_LABEL: &str = "(deleted)";

/// Maximum category label length
pub const MAX_CATEGORY_LABEL_LEN: usize = 100;

/// Maximum routine title length
pub const MAX_TITLE_LEN: usize = 200;
