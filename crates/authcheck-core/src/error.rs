//! Failure taxonomy for a single analysis run.
//!
//! Every stage of the pipeline reports through [`AnalysisError`], and each
//! variant maps to one [`ErrorKind`] so callers (and the JSON consumer on the
//! other side of the CLI) can branch on what went wrong.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;

/// Underlying cause carried by the load and inference variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The inference runtime itself could not be brought up.
    #[error("setup error: {0}")]
    Setup(String),

    #[error("model not found at: {}{}", .primary.display(), fallback_suffix(.fallback))]
    ModelNotFound {
        primary: PathBuf,
        fallback: Option<PathBuf>,
    },

    #[error("model load failed: {}: {source}", .path.display())]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("image file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("preprocessing failed: {}: {source}", .path.display())]
    Preprocess {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("prediction failed: {0}")]
    Predict(#[source] BoxError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

fn fallback_suffix(fallback: &Option<PathBuf>) -> String {
    match fallback {
        Some(path) => format!(" or {}", path.display()),
        None => String::new(),
    }
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::Setup(_) => ErrorKind::Setup,
            AnalysisError::ModelNotFound { .. } => ErrorKind::ModelNotFound,
            AnalysisError::ModelLoad { .. } => ErrorKind::ModelLoad,
            AnalysisError::InputNotFound(_) => ErrorKind::InputNotFound,
            AnalysisError::Preprocess { .. } => ErrorKind::Preprocess,
            AnalysisError::Predict(_) => ErrorKind::Predict,
            AnalysisError::InvalidConfig(_) => ErrorKind::InvalidConfig,
        }
    }
}

/// Stable, machine-readable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Usage,
    Setup,
    ModelNotFound,
    ModelLoad,
    InputNotFound,
    Preprocess,
    Predict,
    InvalidConfig,
    Fatal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Usage => "usage",
            ErrorKind::Setup => "setup",
            ErrorKind::ModelNotFound => "model_not_found",
            ErrorKind::ModelLoad => "model_load",
            ErrorKind::InputNotFound => "input_not_found",
            ErrorKind::Preprocess => "preprocess",
            ErrorKind::Predict => "predict",
            ErrorKind::InvalidConfig => "invalid_config",
            ErrorKind::Fatal => "fatal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
