//! Job types for the queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cutsheet_models::{JobId, VideoId};

/// Job to run one processing attempt for a video.
///
/// This is the hand-off from the trigger site: video id + source URL and
/// nothing else. The trigger does not await the run and has no channel
/// back to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessVideoJob {
    /// Unique job ID
    pub job_id: JobId,
    /// User ID (owner of the video)
    pub user_id: String,
    /// Video ID
    pub video_id: VideoId,
    /// Source video URL (bounded-validity signed URL)
    pub video_url: String,
    /// When the job was created
    pub created_at: DateTime<Utc>,
}

impl ProcessVideoJob {
    /// Create a new processing job.
    pub fn new(
        user_id: impl Into<String>,
        video_id: VideoId,
        video_url: impl Into<String>,
    ) -> Self {
        Self {
            job_id: JobId::new(),
            user_id: user_id.into(),
            video_id,
            video_url: video_url.into(),
            created_at: Utc::now(),
        }
    }

    /// Generate idempotency key for deduplication.
    pub fn idempotency_key(&self) -> String {
        format!("process:{}:{}", self.user_id, self.video_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_serde_round_trip() {
        let job = ProcessVideoJob::new("user-1", VideoId::new(), "https://cdn.example/v.mp4");

        let json = serde_json::to_string(&job).expect("serialize ProcessVideoJob");
        let decoded: ProcessVideoJob =
            serde_json::from_str(&json).expect("deserialize ProcessVideoJob");

        assert_eq!(decoded.job_id, job.job_id);
        assert_eq!(decoded.user_id, job.user_id);
        assert_eq!(decoded.video_id, job.video_id);
        assert_eq!(decoded.video_url, job.video_url);
        assert_eq!(decoded.created_at, job.created_at);
    }

    #[test]
    fn test_idempotency_key_ignores_job_id() {
        let video_id = VideoId::from_string("vid-1");
        let a = ProcessVideoJob::new("user-1", video_id.clone(), "https://a");
        let b = ProcessVideoJob::new("user-1", video_id, "https://a");

        assert_ne!(a.job_id, b.job_id);
        assert_eq!(a.idempotency_key(), b.idempotency_key());
    }
}
