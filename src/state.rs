use std::sync::Arc;

use crate::auth::SessionResolver;
use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::middleware::route_scope::{RouteScope, ScopeError};

/// Route settings both guards read on every request
#[derive(Debug)]
pub struct GuardConfig {
    pub scope: RouteScope,
    pub cookie_name: String,
    pub public_entry: String,
    pub app_entry: String,
}

impl GuardConfig {
    pub fn from_config(config: &AppConfig) -> Result<Self, ScopeError> {
        Ok(Self {
            scope: config.guard_scope()?,
            cookie_name: config.auth.cookie_name.clone(),
            public_entry: config.routes.public_entry.clone(),
            app_entry: config.routes.app_entry.clone(),
        })
    }
}

/// Shared application state, built once in `main`
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseManager>,
    pub resolver: Arc<dyn SessionResolver>,
    pub guard: Arc<GuardConfig>,
}

impl AppState {
    pub fn new(db: DatabaseManager, resolver: Arc<dyn SessionResolver>, guard: GuardConfig) -> Self {
        Self {
            db: Arc::new(db),
            resolver,
            guard: Arc::new(guard),
        }
    }
}
