//! Error types for model construction.

use cf_core::CoreError;
use thiserror::Error;

/// Errors raised while building a circulation model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Invalid initial state {name} = {value}: {reason}")]
    InvalidInitialState {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

pub type ModelResult<T> = Result<T, ModelError>;

impl From<ModelError> for CoreError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::InvalidParameter { name, value, .. }
            | ModelError::InvalidInitialState { name, value, .. } => CoreError::OutOfRange {
                what: name,
                value,
                expected: "a valid model input",
            },
        }
    }
}
