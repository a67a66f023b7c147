//! Application setup and initialization
//!
//! All application initialization logic lives here rather than in main.rs
//! for better organization and testability.

pub mod routes;
pub mod server;
pub mod services;

use crate::state::AppState;
use anyhow::{Context, Result};
use speechops_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry();
    tracing::info!("Configuration loaded and validated successfully");

    // Upstream clients and the credential validator
    let state = services::initialize_services(&config)?;

    // Routes
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
