use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::json;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, ConfigError};
use crate::handlers::{protected, public};
use crate::middleware::{redirect_if_authenticated, require_credential};
use crate::state::AppState;

/// Full router: guard layers, routes, and global middleware
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public-only pages sit behind the reverse guard
        .merge(public_routes(state.clone()))
        // Protected pages and API
        .merge(protected_routes())
        .route("/health", get(health))
        // Cookie presence guard; out-of-scope paths pass straight through
        .layer(middleware::from_fn_with_state(state.clone(), require_credential))
        .with_state(state)
}

/// `app` plus CORS and request tracing, as served by the binary
pub fn app_with_layers(state: AppState, config: &AppConfig) -> Result<Router, ConfigError> {
    let mut router = app(state);

    if config.security.enable_cors {
        let origins = config.security.cors_header_values()?;
        router = router.layer(CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_credentials(true));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    Ok(router)
}

fn public_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/sign-in", get(public::sign_in_get))
        .route("/sign-up", get(public::sign_up_get))
        .route_layer(middleware::from_fn_with_state(state, redirect_if_authenticated))
}

fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(protected::dashboard_get))
        .route(
            "/api/watchlist",
            get(protected::watchlist_get).post(protected::watchlist_post),
        )
        .route(
            "/api/watchlist/:symbol",
            get(protected::watchlist_symbol_get).delete(protected::watchlist_symbol_delete),
        )
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.db.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
