//! Shared library for the anime dashboard.
//!
//! This crate provides the pieces used by both the dashboard library and its
//! terminal front end:
//! - Configuration management
//! - Domain models (shaped rows, view parameters, suggestions)
//! - Logging infrastructure

pub mod config;
pub mod logging;
pub mod models;

// Re-export commonly used types
pub use config::{Config, ConfigSource};
pub use logging::LogConfig;
pub use models::*;

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
