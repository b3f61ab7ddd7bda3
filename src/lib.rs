//! Pitchivo access service — library crate for integration testing.
//!
//! Re-exports modules needed by integration tests in `tests/`.

pub mod access;
pub mod api;
pub mod config;
pub mod errors;
pub mod jobs;
pub mod models;
pub mod store;

use config::Config;
use store::postgres::PgStore;

/// Shared application state passed to handlers and middleware.
pub struct AppState {
    pub db: PgStore,
    pub config: Config,
}
