use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use sea_orm::DatabaseConnection;

use crate::config::{AppConfig, Environment};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DatabaseConnection,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: AppConfig, db: DatabaseConnection) -> Arc<Self> {
        Arc::new(Self {
            config,
            db,
            started_at: Instant::now(),
        })
    }

    pub fn environment(&self) -> Environment {
        self.config.general.environment
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
