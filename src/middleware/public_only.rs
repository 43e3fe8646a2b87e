use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::auth::GuardDecision;
use crate::auth::{Credential, SessionResolver};
use crate::state::AppState;

/// Decide whether a public-only page may be shown.
///
/// Needs the full session, not just the cookie: a stale cookie must still
/// see the sign-in form. A resolver failure is treated like no session.
pub async fn public_only_decision(
    credential: Option<&Credential>,
    resolver: &dyn SessionResolver,
    app_entry: &str,
) -> GuardDecision {
    let Some(credential) = credential else {
        return GuardDecision::Proceed;
    };

    match resolver.resolve(credential).await {
        Ok(Some(session)) => {
            tracing::debug!("User {} already signed in, leaving public page", session.user_id);
            GuardDecision::Redirect(app_entry.to_string())
        }
        Ok(None) => GuardDecision::Proceed,
        Err(e) => {
            tracing::warn!("Session resolution failed on public page: {}", e);
            GuardDecision::Proceed
        }
    }
}

/// Reverse guard for sign-in / sign-up: signed-in callers go to the app
pub async fn redirect_if_authenticated(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let credential = Credential::from_headers(request.headers(), &state.guard.cookie_name);

    match public_only_decision(credential.as_ref(), state.resolver.as_ref(), &state.guard.app_entry).await {
        GuardDecision::Proceed => next.run(request).await,
        GuardDecision::Redirect(to) => Redirect::to(&to).into_response(),
    }
}
