//! Worker error types.

use thiserror::Error;

use cutsheet_models::VideoId;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Inference failed: {0}")]
    Inference(String),

    #[error(transparent)]
    Extraction(#[from] cutsheet_parser::ParseError),

    #[error("Persistence failed: {0}")]
    Persistence(#[from] cutsheet_firestore::FirestoreError),

    #[error("Video not found: {0}")]
    VideoNotFound(VideoId),

    #[error("Queue operation failed: {0}")]
    Queue(#[from] cutsheet_queue::QueueError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl WorkerError {
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// True when the extraction stage found nothing in either grammar.
    pub fn is_no_scenes(&self) -> bool {
        matches!(
            self,
            WorkerError::Extraction(cutsheet_parser::ParseError::NoScenesExtracted)
        )
    }
}

impl From<cutsheet_inference::InferenceError> for WorkerError {
    fn from(e: cutsheet_inference::InferenceError) -> Self {
        Self::Inference(e.to_string())
    }
}
