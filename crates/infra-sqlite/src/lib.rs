// Offload Infrastructure - SQLite Adapter
// Implements: StateStore

mod connection;
mod migration;
mod state_store;

pub use connection::create_pool;
pub use migration::run_migrations;
pub use state_store::SqliteStateStore;

// Note: sqlx::Error conversion is handled by wrapping in helper functions
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
