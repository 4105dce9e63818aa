use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{what} not found (looked in: {})", display_paths(.candidates))]
    InputMissing {
        what: &'static str,
        candidates: Vec<PathBuf>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Input format error: {0}")]
    Format(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Chart error: {0}")]
    Chart(String),

    #[error("Terminal error: {0}")]
    Terminal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl AppError {
    /// Wrap any plotters drawing error, which carry backend-specific types.
    pub fn chart(e: impl std::fmt::Display) -> Self {
        AppError::Chart(e.to_string())
    }
}
