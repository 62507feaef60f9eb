//! Error types for Paceline

use thiserror::Error;

/// Errors that can occur during activity analysis
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid input stream: {0}")]
    InvalidInput(String),

    #[error("Degenerate signal: {0}")]
    DegenerateSignal(String),
}
