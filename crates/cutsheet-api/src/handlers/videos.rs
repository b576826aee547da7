//! Video API handlers.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use cutsheet_firestore::{SheetRepository, VideoRepository};
use cutsheet_models::{VideoId, VideoRecord};
use cutsheet_queue::ProcessVideoJob;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Request body for the process trigger.
#[derive(Deserialize)]
pub struct ProcessRequest {
    pub video_url: String,
}

/// Response for an accepted process trigger.
#[derive(Serialize)]
pub struct ProcessAccepted {
    pub job_id: String,
    pub video_id: String,
    pub status: String,
}

/// One sheet in a video info response.
#[derive(Serialize)]
pub struct SheetInfo {
    pub sheet_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Video info response.
#[derive(Serialize)]
pub struct VideoInfoResponse {
    pub id: String,
    pub title: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub sheets: Vec<SheetInfo>,
}

/// Identity forwarded by the gateway.
fn user_id_from(headers: &HeaderMap) -> ApiResult<String> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .ok_or_else(|| ApiError::bad_request("Missing X-User-Id header"))
}

/// Load a video and enforce ownership. A foreign video reads as missing.
async fn owned_video(
    state: &AppState,
    video_id: &VideoId,
    user_id: &str,
) -> ApiResult<VideoRecord> {
    let repo = VideoRepository::new((*state.firestore).clone());
    let video = repo
        .get(video_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    if video.user_id != user_id {
        return Err(ApiError::not_found("Video not found"));
    }
    Ok(video)
}

/// Trigger one processing attempt for a video.
///
/// Fire-and-forget: the job is enqueued and `202 Accepted` returned
/// without awaiting the run. The record is moved to `processing` here so
/// pollers see the attempt immediately; the orchestrator's own
/// `processing` write is idempotent with this one.
pub async fn process_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<ProcessRequest>,
) -> ApiResult<(StatusCode, Json<ProcessAccepted>)> {
    let user_id = user_id_from(&headers)?;
    if body.video_url.is_empty() {
        return Err(ApiError::bad_request("video_url must not be empty"));
    }

    let video_id = VideoId::from_string(video_id);
    owned_video(&state, &video_id, &user_id).await?;

    let job = ProcessVideoJob::new(user_id, video_id.clone(), body.video_url);

    match state.queue.enqueue(&job).await {
        Ok(_) => {}
        Err(e) if e.is_duplicate() => {
            return Err(ApiError::conflict("Processing already in progress"));
        }
        Err(e) => return Err(e.into()),
    }

    let repo = VideoRepository::new((*state.firestore).clone());
    if let Err(e) = repo.mark_processing(&video_id).await {
        // The worker sets the status anyway; the poller just sees the
        // transition a moment later.
        warn!(video_id = %video_id, error = %e, "failed to pre-mark processing");
    }

    info!(video_id = %video_id, job_id = %job.job_id, "queued processing job");

    Ok((
        StatusCode::ACCEPTED,
        Json(ProcessAccepted {
            job_id: job.job_id.to_string(),
            video_id: video_id.to_string(),
            status: "processing".to_string(),
        }),
    ))
}

/// Get a video's lifecycle record and its sheets.
pub async fn get_video_info(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<VideoInfoResponse>> {
    let user_id = user_id_from(&headers)?;
    let video_id = VideoId::from_string(video_id);
    let video = owned_video(&state, &video_id, &user_id).await?;

    let sheets = SheetRepository::new((*state.firestore).clone(), video_id.clone())
        .list()
        .await?
        .into_iter()
        .map(|sheet| SheetInfo {
            sheet_id: sheet.sheet_id.to_string(),
            title: sheet.title,
            created_at: sheet.created_at,
        })
        .collect();

    Ok(Json(VideoInfoResponse {
        id: video.video_id.to_string(),
        title: video.title,
        status: video.status.to_string(),
        created_at: video.created_at,
        updated_at: video.updated_at,
        completed_at: video.completed_at,
        error_message: video.error_message,
        sheets,
    }))
}

/// Delete a video together with its sheets and entries.
pub async fn delete_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let user_id = user_id_from(&headers)?;
    let video_id = VideoId::from_string(video_id);
    owned_video(&state, &video_id, &user_id).await?;

    let sheet_repo = SheetRepository::new((*state.firestore).clone(), video_id.clone());
    for sheet in sheet_repo.list().await? {
        sheet_repo.delete(&sheet.sheet_id).await?;
    }

    VideoRepository::new((*state.firestore).clone())
        .delete(&video_id)
        .await?;

    info!(video_id = %video_id, "deleted video and its sheets");
    Ok(StatusCode::NO_CONTENT)
}
