//! Error types for model directory and schema utilities

use thiserror::Error;

/// Error type for model directory and schema utilities
#[derive(Error, Debug)]
pub enum Error {
    /// Core library error
    #[error("Core error: {0}")]
    Core(#[from] openml_core::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The model, its directory or its schema could not be loaded
    #[error("Model loading failed: {0}")]
    ModelLoading(String),

    /// A categorical value schema was required
    #[error("The target variable is not a categorical value: {0}")]
    NotCategorical(String),
}

/// Result type for model directory and schema utilities
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for openml_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Core(err) => err,
            Error::Io(err) => openml_core::Error::Io(err),
            Error::ModelLoading(message) | Error::NotCategorical(message) => openml_core::Error::ModelLoading(message),
        }
    }
}
