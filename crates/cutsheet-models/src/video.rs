//! Video lifecycle records.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Generate a new random video ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Video processing status.
///
/// `Uploading` is set by the upload collaborator; the orchestrator moves
/// the record to `Processing` and always leaves it in exactly one of the
/// terminal states before its run returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    /// Upload in progress, not yet submitted for processing
    #[default]
    Uploading,
    /// An orchestrator run owns the video
    Processing,
    /// Montage sheet persisted successfully
    Completed,
    /// The run failed; `error_message` carries the reason
    Error,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Uploading => "uploading",
            VideoStatus::Processing => "processing",
            VideoStatus::Completed => "completed",
            VideoStatus::Error => "error",
        }
    }

    /// Parse from the stored string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "uploading" => Some(VideoStatus::Uploading),
            "processing" => Some(VideoStatus::Processing),
            "completed" => Some(VideoStatus::Completed),
            "error" => Some(VideoStatus::Error),
            _ => None,
        }
    }

    /// Check if this is a terminal state (no more transitions expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, VideoStatus::Completed | VideoStatus::Error)
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Video metadata stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoRecord {
    /// Unique video ID
    pub video_id: VideoId,

    /// User ID (owner)
    pub user_id: String,

    /// Source video URL (bounded-validity signed URL)
    pub video_url: String,

    /// Display title
    pub title: String,

    /// Processing status
    #[serde(default)]
    pub status: VideoStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Completion timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Error message (if the last run failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl VideoRecord {
    /// Create a new video record in the `Uploading` state.
    pub fn new(
        video_id: VideoId,
        user_id: impl Into<String>,
        video_url: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            video_id,
            user_id: user_id.into(),
            video_url: video_url.into(),
            title: title.into(),
            status: VideoStatus::Uploading,
            created_at: now,
            updated_at: now,
            completed_at: None,
            error_message: None,
        }
    }

    /// Mark as processing. Clears any stale error from a previous run.
    pub fn begin_processing(mut self) -> Self {
        self.status = VideoStatus::Processing;
        self.error_message = None;
        self.updated_at = Utc::now();
        self
    }

    /// Mark as completed.
    pub fn complete(mut self) -> Self {
        self.status = VideoStatus::Completed;
        self.completed_at = Some(Utc::now());
        self.updated_at = Utc::now();
        self
    }

    /// Mark as failed with a human-readable message.
    pub fn fail(mut self, error: impl Into<String>) -> Self {
        self.status = VideoStatus::Error;
        self.error_message = Some(error.into());
        self.updated_at = Utc::now();
        self
    }
}
