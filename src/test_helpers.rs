use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;

use crate::{
    config::{AppConfig, Environment},
    db::connection,
    routes::app,
    state::AppState,
};

/// State over a fresh in-memory database with the schema applied.
pub async fn test_state() -> Arc<AppState> {
    test_state_with(AppConfig::for_tests()).await
}

pub async fn test_state_with(cfg: AppConfig) -> Arc<AppState> {
    let db = connection::open(&cfg.database)
        .await
        .expect("open in-memory database");
    AppState::new(cfg, db)
}

/// State over an arbitrary connection (usually a `MockDatabase`).
pub fn state_with_db(db: DatabaseConnection, environment: Environment) -> Arc<AppState> {
    let mut cfg = AppConfig::for_tests();
    cfg.general.environment = environment;
    AppState::new(cfg, db)
}

pub async fn test_app() -> Router {
    app(test_state().await)
}
