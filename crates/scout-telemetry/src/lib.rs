#![allow(clippy::uninlined_format_args)]

//! Telemetry for packscout
//!
//! This crate provides:
//! - Global `tracing` subscriber setup driven by [`scout_config::LogConfig`]
//! - Timed spans for pipeline stages

pub mod logging;

pub use logging::*;

use thiserror::Error;

/// Telemetry error types
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),

    /// Invalid logging configuration
    #[error("Logging error: {0}")]
    Logging(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for telemetry operations
pub type Result<T> = std::result::Result<T, TelemetryError>;
