use thiserror::Error;

/// Errors a researcher may report.
///
/// The supervisor treats every variant the same way; the variants exist
/// for logging.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Researcher failed: {0}")]
    Failed(String),

    #[error("Researcher returned an unusable result: {0}")]
    InvalidOutput(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl WorkerError {
    /// Creates a generic failure.
    pub fn failed(message: impl Into<String>) -> Self {
        WorkerError::Failed(message.into())
    }
}

impl From<serde_json::Error> for WorkerError {
    fn from(err: serde_json::Error) -> Self {
        WorkerError::InvalidOutput(err.to_string())
    }
}
