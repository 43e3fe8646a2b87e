// handlers/public/mod.rs - Public-only handlers
//
// Reachable without a session. Signed-in callers are bounced to the app by
// the reverse guard before these run.

pub mod pages;

pub use pages::{sign_in_get, sign_up_get};
