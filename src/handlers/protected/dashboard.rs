// handlers/protected/dashboard.rs - GET / handler

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;

use crate::auth::Session;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, CurrentSession};
use crate::services::watchlist_service;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub user: Session,
    pub watchlist: Vec<String>,
}

/// GET / - Main application entry point
///
/// The guard has only seen a cookie; the session is resolved here. A cookie
/// that no longer resolves sends the caller back to sign in. An auth service
/// failure is still reported as an error.
pub async fn dashboard_get(
    State(state): State<AppState>,
    session: Result<CurrentSession, ApiError>,
) -> Result<Response, ApiError> {
    let session = match session {
        Ok(CurrentSession(session)) => session,
        Err(ApiError::Unauthorized(_)) => {
            return Ok(Redirect::to(&state.guard.public_entry).into_response());
        }
        Err(e) => return Err(e),
    };

    let watchlist = watchlist_service::symbols_for_user(&state.db, &session.user_id).await?;

    Ok(ApiResponse::success(Dashboard {
        user: session,
        watchlist,
    })
    .into_response())
}
