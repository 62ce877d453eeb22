use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;

/// Shared application context, constructed once in `main` and handed to
/// every handler through axum state instead of living in process globals.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }
}
