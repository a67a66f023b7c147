//! Speechops Core Library
//!
//! This crate provides the shared configuration, error types, and wire models
//! used by the speechops services and API.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
