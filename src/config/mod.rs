use axum::http::HeaderValue;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

use crate::middleware::route_scope::{RouteRule, RouteScope, ScopeError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub routes: RoutesConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Resource location; absence surfaces at first acquire, not at startup
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AuthMode {
    /// Forward the session cookie to the auth service's get-session endpoint
    Remote,
    /// Verify the session cookie locally as an HS256 token
    Jwt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub mode: AuthMode,
    pub cookie_name: String,
    pub service_url: Option<String>,
    pub jwt_secret: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutesConfig {
    /// Where unauthenticated callers are sent
    pub public_entry: String,
    /// Where authenticated callers are sent away from sign-in/sign-up
    pub app_entry: String,
    pub public_pages: Vec<String>,
    pub asset_prefixes: Vec<String>,
    pub asset_files: Vec<String>,
    pub auth_handshake_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("CORS origin {0:?} is a wildcard; credentialed CORS needs explicit origins")]
    WildcardCorsOrigin(String),

    #[error("CORS origin {0:?} is not a valid header value")]
    InvalidCorsOrigin(String),
}

impl SecurityConfig {
    /// Allowed origins as header values; rejects `*` and unparseable entries
    pub fn cors_header_values(&self) -> Result<Vec<HeaderValue>, ConfigError> {
        self.cors_origins
            .iter()
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                if origin.contains('*') {
                    return Err(ConfigError::WildcardCorsOrigin(origin.clone()));
                }
                HeaderValue::from_str(origin).map_err(|_| ConfigError::InvalidCorsOrigin(origin.clone()))
            })
            .collect()
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Auth overrides
        if let Ok(v) = env::var("AUTH_MODE") {
            match v.as_str() {
                "remote" => self.auth.mode = AuthMode::Remote,
                "jwt" => self.auth.mode = AuthMode::Jwt,
                _ => {}
            }
        }
        if let Ok(v) = env::var("AUTH_COOKIE_NAME") {
            self.auth.cookie_name = v;
        }
        if let Ok(v) = env::var("AUTH_SERVICE_URL") {
            self.auth.service_url = Some(v);
        }
        if let Ok(v) = env::var("AUTH_JWT_SECRET") {
            self.auth.jwt_secret = v;
        }
        if let Ok(v) = env::var("AUTH_REQUEST_TIMEOUT_SECS") {
            self.auth.request_timeout_secs = v.parse().unwrap_or(self.auth.request_timeout_secs);
        }

        // Route overrides
        if let Ok(v) = env::var("ROUTES_PUBLIC_ENTRY") {
            self.routes.public_entry = v;
        }
        if let Ok(v) = env::var("ROUTES_APP_ENTRY") {
            self.routes.app_entry = v;
        }

        // API overrides (PORT kept for platform compatibility)
        if let Some(port) = env::var("FINWATCH_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.api.port = port;
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    /// Build the protected-route scope from the route config.
    ///
    /// Everything is included; public pages, assets and the auth service's
    /// handshake traffic are carved out so the guard can never redirect to
    /// itself.
    pub fn guard_scope(&self) -> Result<RouteScope, ScopeError> {
        let routes = &self.routes;
        let mut exclude = Vec::new();

        exclude.push(RouteRule::Exact(routes.public_entry.clone()));
        exclude.extend(routes.public_pages.iter().cloned().map(RouteRule::Exact));
        exclude.extend(routes.asset_prefixes.iter().cloned().map(RouteRule::Prefix));
        exclude.extend(routes.asset_files.iter().cloned().map(RouteRule::Exact));
        exclude.push(RouteRule::Prefix(routes.auth_handshake_prefix.clone()));
        exclude.push(RouteRule::Exact("/health".to_string()));

        RouteScope::new(vec![RouteRule::Prefix("/".to_string())], exclude)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                connection_timeout: 30,
            },
            auth: AuthConfig::default_for(AuthMode::Jwt),
            routes: RoutesConfig::default(),
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 10,
            },
            auth: AuthConfig::default_for(AuthMode::Remote),
            routes: RoutesConfig::default(),
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 5,
            },
            auth: AuthConfig::default_for(AuthMode::Remote),
            routes: RoutesConfig::default(),
            api: ApiConfig {
                port: 3000,
                enable_request_logging: false,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }
}

impl AuthConfig {
    fn default_for(mode: AuthMode) -> Self {
        Self {
            mode,
            cookie_name: "better-auth.session_token".to_string(),
            service_url: None,
            jwt_secret: String::new(),
            request_timeout_secs: 5,
        }
    }
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            public_entry: "/sign-in".to_string(),
            app_entry: "/".to_string(),
            public_pages: vec!["/sign-up".to_string()],
            asset_prefixes: vec!["/assets".to_string(), "/static".to_string()],
            asset_files: vec!["/favicon.ico".to_string()],
            auth_handshake_prefix: "/api/auth".to_string(),
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
