pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY,
    workspace_id INTEGER NOT NULL,
    label TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS routines (
    id INTEGER PRIMARY KEY,
    workspace_id INTEGER NOT NULL,
    owner_id INTEGER NOT NULL,
    title TEXT NOT NULL,
    start_time TEXT NOT NULL,
    end_time TEXT,
    summary TEXT,
    notes TEXT,
    days_of_week TEXT NOT NULL,
    category_id INTEGER NOT NULL,
    active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS schedule_entries (
    id INTEGER PRIMARY KEY,
    workspace_id INTEGER NOT NULL,
    owner_id INTEGER NOT NULL,
    date TEXT NOT NULL,
    start_time TEXT,
    end_time TEXT,
    summary TEXT,
    notes TEXT,
    checked INTEGER NOT NULL DEFAULT 0,
    category_id INTEGER,
    routine_id INTEGER,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY,
    workspace_id INTEGER NOT NULL,
    owner_id INTEGER NOT NULL,
    summary TEXT NOT NULL,
    notes TEXT,
    completed INTEGER NOT NULL DEFAULT 0,
    pinned INTEGER NOT NULL DEFAULT 0,
    pinned_at TEXT,
    moved_to_top_at TEXT,
    schedule_entry_id INTEGER
);

CREATE TABLE IF NOT EXISTS report_metrics (
    id INTEGER PRIMARY KEY,
    report_id INTEGER NOT NULL,
    category_id INTEGER,
    total_minutes INTEGER NOT NULL,
    completion_rate INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_entries_scope_date ON schedule_entries(workspace_id, owner_id, date);
CREATE INDEX IF NOT EXISTS idx_entries_routine ON schedule_entries(routine_id);
CREATE INDEX IF NOT EXISTS idx_tasks_entry ON tasks(schedule_entry_id);
CREATE INDEX IF NOT EXISTS idx_metrics_report ON report_metrics(report_id);
"#;

// Category references are plain identifiers on purpose: categories are
// deletable independently, and routines/entries keep dangling ids.
