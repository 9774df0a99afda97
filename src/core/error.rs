// src/core/error.rs

use std::time::Duration;
use thiserror::Error;

/// Errors that can cross the scanner's public boundary.
///
/// Only `InvalidInput` and `InvalidConfiguration` ever reach the caller of
/// [`crate::core::scanner::Scanner::scan`]; `Pipeline` is absorbed by the
/// fallback report.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid URL '{input}': {reason}")]
    InvalidInput { input: String, reason: String },

    #[error("Scan pipeline failed: {0}")]
    Pipeline(String),
}

/// Failures inside a single provider call. The orchestrator converts these
/// into that provider's degraded result.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("Could not parse provider response: {0}")]
    Parse(String),

    #[error("Provider timed out after {0:?}")]
    Timeout(Duration),
}
