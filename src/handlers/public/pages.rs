// handlers/public/pages.rs - GET /sign-in, GET /sign-up
//
// Rendering lives in the frontend; these describe the entry point so the
// client knows which form to show and where the auth service is.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn sign_in_get(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "page": "sign-in",
            "auth_endpoint": "/api/auth/sign-in/email",
            "alternate": "/sign-up",
            "after_sign_in": state.guard.app_entry,
        }
    }))
}

pub async fn sign_up_get(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "page": "sign-up",
            "auth_endpoint": "/api/auth/sign-up/email",
            "alternate": state.guard.public_entry,
            "after_sign_in": state.guard.app_entry,
        }
    }))
}
