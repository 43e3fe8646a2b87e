pub mod auth;
pub mod public_only;
pub mod response;
pub mod route_scope;

pub use auth::{require_credential, CurrentSession, GuardDecision};
pub use public_only::redirect_if_authenticated;
pub use response::{ApiResponse, ApiResult};
pub use route_scope::{RouteRule, RouteScope, ScopeError};
