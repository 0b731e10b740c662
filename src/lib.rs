pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod diagnosis;
pub mod extraction;
pub mod models;

use tracing_subscriber::EnvFilter;

/// Initialize tracing. Honours `RUST_LOG`, otherwise logs the crate at info.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
