// handlers/protected/mod.rs - Handlers behind the session cookie guard
//
// Every route here sits inside the guard scope. The guard only checks that a
// session cookie is present; handlers that need the caller's identity take a
// `CurrentSession`, which resolves the cookie against the auth service.

pub mod dashboard;
pub mod watchlist;

pub use dashboard::dashboard_get;
pub use watchlist::{watchlist_get, watchlist_post, watchlist_symbol_delete, watchlist_symbol_get};
