use anyhow::Context;
use tracing_subscriber::EnvFilter;

use finwatch_api::{
    app::app_with_layers,
    auth::resolver_from_config,
    config,
    database::DatabaseManager,
    state::{AppState, GuardConfig},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, AUTH_* etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting finwatch API in {:?} mode", config.environment);

    // Route rules and the session resolver are validated up front; the
    // database is not touched until the first request needs it.
    let guard = GuardConfig::from_config(config).context("invalid route configuration")?;
    let resolver = resolver_from_config(&config.auth).context("invalid auth configuration")?;
    if config.database.url.is_none() {
        tracing::warn!("DATABASE_URL is not set; data routes will answer 503");
    }

    let state = AppState::new(DatabaseManager::new(&config.database), resolver, guard);
    let app = app_with_layers(state.clone(), config).context("invalid CORS configuration")?;

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("finwatch API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    state.db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        // Keep serving rather than shutting down immediately
        std::future::pending::<()>().await;
    }
}
