// handlers/mod.rs - Two-tier handler layout
//
// Public (no session; signed-in callers redirected away) → Protected
// (session cookie required, identity resolved on demand).

pub mod protected;
pub mod public;
