use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::{Credential, Session};
use crate::error::ApiError;
use crate::state::AppState;

/// Outcome of a perimeter check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(String),
}

/// Presence check only: the credential's validity is settled later by
/// whichever handler needs the caller's identity.
pub fn protected_decision(credential: Option<&Credential>, public_entry: &str) -> GuardDecision {
    match credential {
        Some(_) => GuardDecision::Proceed,
        None => GuardDecision::Redirect(public_entry.to_string()),
    }
}

/// Guard for protected routes: no session cookie, no entry.
///
/// Paths outside the configured scope (public pages, assets, auth service
/// handshake traffic) pass straight through. The credential is stored in
/// request extensions for downstream extractors.
pub async fn require_credential(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let guard = &state.guard;
    if !guard.scope.applies_to(request.uri().path()) {
        return next.run(request).await;
    }

    let credential = Credential::from_headers(request.headers(), &guard.cookie_name);

    match protected_decision(credential.as_ref(), &guard.public_entry) {
        GuardDecision::Proceed => {
            if let Some(credential) = credential {
                request.extensions_mut().insert(credential);
            }
            next.run(request).await
        }
        GuardDecision::Redirect(to) => {
            tracing::debug!("No session cookie for {}, redirecting to {}", request.uri().path(), to);
            Redirect::to(&to).into_response()
        }
    }
}

/// Fully resolved session of the caller.
///
/// Rejects with 401 when there is no credential or it no longer resolves,
/// and with 502 when the auth service cannot be asked. Extract as
/// `Result<CurrentSession, ApiError>` to handle the 401 case yourself.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let credential = parts
            .extensions
            .get::<Credential>()
            .cloned()
            .or_else(|| Credential::from_headers(&parts.headers, &state.guard.cookie_name))
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        match state.resolver.resolve(&credential).await? {
            Some(session) => Ok(CurrentSession(session)),
            None => Err(ApiError::unauthorized("Session expired or invalid")),
        }
    }
}
