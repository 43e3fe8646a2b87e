// handlers/protected/watchlist.rs - /api/watchlist handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::database::models::watchlist::WatchlistItem;
use crate::middleware::{ApiResponse, ApiResult, CurrentSession};
use crate::services::watchlist_service;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddWatchlistRequest {
    pub symbol: String,
    #[serde(default)]
    pub company: String,
}

#[derive(Debug, Serialize)]
pub struct WatchlistStatus {
    pub symbol: String,
    pub in_watchlist: bool,
}

/// GET /api/watchlist - List the caller's watchlist, newest first
pub async fn watchlist_get(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> ApiResult<Vec<WatchlistItem>> {
    let items = watchlist_service::list(&state.db, &session.user_id).await?;
    Ok(ApiResponse::success(items))
}

/// POST /api/watchlist - Add a symbol
///
/// Expected Input:
/// ```json
/// { "symbol": "aapl", "company": "Apple Inc." }
/// ```
///
/// The symbol is stored trimmed and uppercased. Adding a symbol that is
/// already present answers 409.
pub async fn watchlist_post(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(payload): Json<AddWatchlistRequest>,
) -> ApiResult<WatchlistItem> {
    let item = watchlist_service::add(&state.db, &session.user_id, &payload.symbol, &payload.company).await?;
    Ok(ApiResponse::created(item))
}

/// GET /api/watchlist/:symbol - Whether a symbol is on the caller's watchlist
pub async fn watchlist_symbol_get(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(symbol): Path<String>,
) -> ApiResult<WatchlistStatus> {
    let in_watchlist = watchlist_service::is_in_watchlist(&state.db, &session.user_id, &symbol).await?;
    Ok(ApiResponse::success(WatchlistStatus {
        symbol: watchlist_service::normalize_symbol(&symbol)?,
        in_watchlist,
    }))
}

/// DELETE /api/watchlist/:symbol - Remove a symbol
pub async fn watchlist_symbol_delete(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(symbol): Path<String>,
) -> ApiResult<WatchlistStatus> {
    let symbol = watchlist_service::remove(&state.db, &session.user_id, &symbol).await?;
    Ok(ApiResponse::success(WatchlistStatus {
        symbol,
        in_watchlist: false,
    }))
}
