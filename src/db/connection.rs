use std::time::Duration;

use anyhow::Context;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::info;

use super::migration;
use crate::config::DatabaseConfig;

const SQLITE_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Opens the process-wide SQLite handle.
///
/// The pool is pinned to a single connection: statements run one at a time in
/// submission order, and a `:memory:` database lives as long as the handle.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    if let Some(dir) = cfg.parent_dir() {
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create database directory {}", dir.display()))?;
    }

    let mut options = ConnectOptions::new(cfg.url());
    options
        .max_connections(1)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(5))
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .with_context(|| format!("failed to open database at {}", cfg.path))?;

    db.execute_unprepared(&format!("PRAGMA busy_timeout = {SQLITE_BUSY_TIMEOUT_MS}"))
        .await?;
    if !cfg.is_in_memory() {
        db.execute_unprepared("PRAGMA journal_mode = WAL").await?;
    }

    info!(path = %cfg.path, "database connected");
    Ok(db)
}

/// Creates the schema if missing. Safe to call more than once.
pub async fn initialize(db: &DatabaseConnection) -> Result<(), DbErr> {
    migration::apply(db).await
}

/// Convenience for startup and tests: [`connect`] followed by [`initialize`].
pub async fn open(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let db = connect(cfg).await?;
    initialize(&db)
        .await
        .context("failed to initialize database schema")?;
    Ok(db)
}

/// Flushes and closes the handle. Callers stop accepting requests first.
pub async fn close(db: DatabaseConnection) -> Result<(), DbErr> {
    db.close().await?;
    info!("database closed");
    Ok(())
}
