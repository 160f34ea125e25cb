//! Shared application state.
//!
//! One `AppState` is constructed at startup and cloned into every handler
//! via axum's `State` extractor. There is no other process-wide state: the
//! pool and config are passed explicitly, never reached through a hidden
//! singleton.

use crate::config::Config;
use crate::db::DbPool;

/// State shared by all routes.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub pool: DbPool,

    /// Configuration loaded once at startup
    pub config: Config,
}
