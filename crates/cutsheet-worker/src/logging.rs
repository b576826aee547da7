//! Structured run logging.

use tracing::{error, info};

use cutsheet_models::{JobId, VideoId};

/// Logger for one processing run, stamping every event with the job and
/// video ids.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    video_id: String,
}

impl JobLogger {
    /// Create a logger for a run.
    pub fn new(job_id: &JobId, video_id: &VideoId) -> Self {
        Self {
            job_id: job_id.to_string(),
            video_id: video_id.to_string(),
        }
    }

    /// Log the start of a run.
    pub fn log_start(&self, message: &str) {
        info!(job_id = %self.job_id, video_id = %self.video_id, "Run started: {}", message);
    }

    /// Log a progress update during a run.
    pub fn log_progress(&self, message: &str) {
        info!(job_id = %self.job_id, video_id = %self.video_id, "Run progress: {}", message);
    }

    /// Log a run failure.
    pub fn log_error(&self, message: &str) {
        error!(job_id = %self.job_id, video_id = %self.video_id, "Run error: {}", message);
    }

    /// Log the completion of a run.
    pub fn log_completion(&self, message: &str) {
        info!(job_id = %self.job_id, video_id = %self.video_id, "Run completed: {}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_captures_ids() {
        let job_id = JobId::new();
        let logger = JobLogger::new(&job_id, &VideoId::from_string("vid-1"));
        assert_eq!(logger.job_id, job_id.to_string());
        assert_eq!(logger.video_id, "vid-1");
    }
}
