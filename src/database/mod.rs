pub mod handle_cache;
pub mod manager;
pub mod models;
pub mod schema;

pub use handle_cache::{ConnectError, Connector, HandleCache};
pub use manager::{DatabaseError, DatabaseManager, PgConnector};
