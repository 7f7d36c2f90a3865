use thiserror::Error;

use crate::models::domain::job::JobStatus;

/// User-correctable validation failures. These are rejected before any remote
/// call is made, so a failed validation never leaves partial state behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("File type not supported for '{name}': .{extension}")]
    UnsupportedType { name: String, extension: String },

    #[error("File too large: '{name}' is {size_mb:.1}MB (max: {max_mb}MB)")]
    TooLarge {
        name: String,
        size_mb: f64,
        max_mb: u64,
    },

    #[error("A document named '{0}' is already uploaded")]
    DuplicateName(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Job {run_id} timed out after {timeout_secs}s; it may still be running remotely")]
    JobTimeout { run_id: String, timeout_secs: u64 },

    #[error("Job {run_id} ended with status '{status}'")]
    JobFailed { run_id: String, status: JobStatus },

    #[error("Could not parse a JSON array out of the model output")]
    UnparseableOutput { raw: String },

    #[error("Platform request failed: {0}")]
    Platform(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl AppError {
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION",
            AppError::JobTimeout { .. } => "JOB_TIMEOUT",
            AppError::JobFailed { .. } => "JOB_FAILED",
            AppError::UnparseableOutput { .. } => "UNPARSEABLE_OUTPUT",
            AppError::Platform(_) => "PLATFORM",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::Io(_) => "IO",
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Platform(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
