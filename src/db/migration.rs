//! Schema for the `tasks` table.
//!
//! Every statement is `IF NOT EXISTS`, so [`apply`] can run on each startup.

use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr};
use tracing::info;

// Column defaults render UTC with millisecond precision, e.g. `2024-05-01T09:30:00.125Z`.
const CREATE_TASKS_TABLE: &str = "CREATE TABLE IF NOT EXISTS tasks (\
     id INTEGER PRIMARY KEY AUTOINCREMENT, \
     title TEXT NOT NULL CHECK (length(title) BETWEEN 1 AND 200), \
     description TEXT CHECK (description IS NULL OR length(description) <= 1000), \
     completed INTEGER NOT NULL DEFAULT 0 CHECK (completed IN (0, 1)), \
     priority TEXT NOT NULL DEFAULT 'medium' CHECK (priority IN ('low', 'medium', 'high')), \
     created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')), \
     updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))\
     )";

const CREATE_CREATED_AT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks (created_at DESC, id DESC)";

const CREATE_FILTER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_tasks_completed_priority ON tasks (completed, priority)";

// Bumps updated_at after any UPDATE, at least 1 ms past the previous value so
// two writes inside the same millisecond still move it forward.
const CREATE_TOUCH_TRIGGER: &str = "CREATE TRIGGER IF NOT EXISTS tasks_touch_updated_at \
     AFTER UPDATE ON tasks \
     FOR EACH ROW \
     BEGIN \
         UPDATE tasks \
         SET updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', \
             max(julianday('now'), julianday(OLD.updated_at) + 1.0 / 86400000.0)) \
         WHERE id = NEW.id; \
     END";

const SCHEMA: [&str; 4] = [
    CREATE_TASKS_TABLE,
    CREATE_CREATED_AT_INDEX,
    CREATE_FILTER_INDEX,
    CREATE_TOUCH_TRIGGER,
];

pub async fn apply(db: &DatabaseConnection) -> Result<(), DbErr> {
    for statement in SCHEMA {
        db.execute_unprepared(statement).await?;
    }
    info!("task schema ready");
    Ok(())
}
