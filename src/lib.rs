pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod db;

pub use db::DbPool;

use config::Config;

/// Shared per-request state: configuration plus the connection pool. The pool
/// is constructed by the caller (server startup or tests) and injected here.
pub struct AppState {
    pub config: Config,
    pub db: DbPool,
}

impl AppState {
    pub fn new(config: Config, db: DbPool) -> Self {
        Self { config, db }
    }
}
