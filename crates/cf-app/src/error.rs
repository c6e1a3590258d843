//! Error types for the cf-app service layer.

use std::path::PathBuf;

/// Application error type shared by every frontend.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to write {path}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Model error: {0}")]
    Model(String),

    #[error("Simulation error: {message}")]
    Simulation {
        message: String,
        /// Last accepted time for divergence failures.
        last_t: Option<f64>,
    },

    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cf-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<cf_project::ProjectError> for AppError {
    fn from(err: cf_project::ProjectError) -> Self {
        AppError::Project(err.to_string())
    }
}

impl From<cf_project::ValidationError> for AppError {
    fn from(err: cf_project::ValidationError) -> Self {
        AppError::Project(err.to_string())
    }
}

impl From<cf_model::ModelError> for AppError {
    fn from(err: cf_model::ModelError) -> Self {
        AppError::Model(err.to_string())
    }
}

impl From<cf_sim::SimError> for AppError {
    fn from(err: cf_sim::SimError) -> Self {
        AppError::Simulation {
            message: err.to_string(),
            last_t: err.last_state().map(|(t, _)| t),
        }
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Csv(err.to_string())
    }
}
