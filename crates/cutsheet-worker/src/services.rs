//! Collaborator seams for the orchestrator.
//!
//! The inference provider and the persistence layer are external
//! collaborators; the orchestrator talks to them through these traits so
//! its state machine can be exercised against mocks.

use async_trait::async_trait;
use std::sync::Arc;

use cutsheet_firestore::{FirestoreClient, SheetRepository, VideoRepository};
use cutsheet_inference::GeminiClient;
use cutsheet_models::{MontageEntry, MontageSheet, SheetId, VideoId, VideoRecord};

use crate::error::WorkerResult;

/// The external inference collaborator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InferenceService: Send + Sync {
    /// Analyze a video and return the raw response text.
    async fn analyze_video(&self, prompt: &str, video_url: &str) -> WorkerResult<String>;
}

/// The persistence collaborator.
///
/// Writes to the same video record may race across runs; last writer wins
/// on status, which is acceptable since one run per video is expected at
/// a time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MontageStore: Send + Sync {
    async fn get_video(&self, video_id: &VideoId) -> WorkerResult<Option<VideoRecord>>;

    async fn mark_processing(&self, video_id: &VideoId) -> WorkerResult<()>;

    async fn mark_completed(&self, video_id: &VideoId) -> WorkerResult<()>;

    async fn mark_error(&self, video_id: &VideoId, message: &str) -> WorkerResult<()>;

    async fn create_sheet(&self, sheet: &MontageSheet) -> WorkerResult<()>;

    async fn insert_entries(
        &self,
        video_id: &VideoId,
        sheet_id: &SheetId,
        entries: &[MontageEntry],
    ) -> WorkerResult<()>;

    async fn delete_sheet(&self, video_id: &VideoId, sheet_id: &SheetId) -> WorkerResult<()>;
}

/// Gemini-backed inference service.
pub struct GeminiInference {
    client: Arc<GeminiClient>,
}

impl GeminiInference {
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

#[async_trait]
impl InferenceService for GeminiInference {
    async fn analyze_video(&self, prompt: &str, video_url: &str) -> WorkerResult<String> {
        Ok(self.client.analyze_video(prompt, video_url).await?)
    }
}

/// Firestore-backed montage store.
pub struct FirestoreStore {
    client: FirestoreClient,
}

impl FirestoreStore {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    fn videos(&self) -> VideoRepository {
        VideoRepository::new(self.client.clone())
    }

    fn sheets(&self, video_id: &VideoId) -> SheetRepository {
        SheetRepository::new(self.client.clone(), video_id.clone())
    }
}

#[async_trait]
impl MontageStore for FirestoreStore {
    async fn get_video(&self, video_id: &VideoId) -> WorkerResult<Option<VideoRecord>> {
        Ok(self.videos().get(video_id).await?)
    }

    async fn mark_processing(&self, video_id: &VideoId) -> WorkerResult<()> {
        Ok(self.videos().mark_processing(video_id).await?)
    }

    async fn mark_completed(&self, video_id: &VideoId) -> WorkerResult<()> {
        Ok(self.videos().complete(video_id).await?)
    }

    async fn mark_error(&self, video_id: &VideoId, message: &str) -> WorkerResult<()> {
        Ok(self.videos().fail(video_id, message).await?)
    }

    async fn create_sheet(&self, sheet: &MontageSheet) -> WorkerResult<()> {
        Ok(self.sheets(&sheet.video_id).create(sheet).await?)
    }

    async fn insert_entries(
        &self,
        video_id: &VideoId,
        sheet_id: &SheetId,
        entries: &[MontageEntry],
    ) -> WorkerResult<()> {
        Ok(self.sheets(video_id).insert_entries(sheet_id, entries).await?)
    }

    async fn delete_sheet(&self, video_id: &VideoId, sheet_id: &SheetId) -> WorkerResult<()> {
        Ok(self.sheets(video_id).delete(sheet_id).await?)
    }
}
