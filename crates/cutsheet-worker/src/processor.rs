//! Per-video processing orchestration.
//!
//! One call to [`process_video`] is one end-to-end attempt: inference →
//! extraction → persistence → status flip. The status invariant is owned
//! here: however an attempt ends, the video record leaves `processing`
//! before the function returns.

use metrics::counter;
use tracing::{error, info};

use cutsheet_models::{MontageSheet, SheetId, VideoId, DEFAULT_SHEET_TITLE};
use cutsheet_parser::{extract_scenes, number_scenes};
use cutsheet_queue::ProcessVideoJob;

use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::services::{InferenceService, MontageStore};

/// Fixed instructional prompt for the inference provider.
///
/// The emphasized markers it prescribes are the format contract the
/// primary grammar depends on; the cue labels are the fallback grammar's.
pub const MONTAGE_PROMPT: &str = r#"You are a film editor's assistant. Watch this video and break it down into a montage sheet: an ordered list of every distinct shot.

For each shot, output a section in exactly this format:

**<start> - <end>**
**Plan <shot type>:** <one-sentence visual description>
**<Cue label>:** <dialogue or sound>

Rules:
- Timecodes are M:SS or H:MM:SS, in the order the shots appear.
- Shot types are one of: Close, Medium, Wide, Detail, Pan.
- Cue labels are one of: Voice-over, Off-screen, Dialogue, Music. Include one line per audible cue, omit the line if the shot is silent.
- Do not add commentary outside the sections."#;

/// Try to load a custom prompt from a file.
fn load_prompt_from_file() -> Option<String> {
    let prompt_path = std::env::var("PROMPT_FILE").ok()?;
    std::fs::read_to_string(&prompt_path).ok()
}

/// Result of a successful processing attempt.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub sheet_id: SheetId,
    pub entries_count: u32,
}

/// Run one processing attempt for a video.
///
/// Marks the video `processing` (idempotent with the upload path), runs
/// the attempt, and records exactly one terminal status. The returned
/// error mirrors what was written to the video record.
pub async fn process_video(
    store: &dyn MontageStore,
    inference: &dyn InferenceService,
    job: &ProcessVideoJob,
) -> WorkerResult<ProcessOutcome> {
    let logger = JobLogger::new(&job.job_id, &job.video_id);
    logger.log_start("Starting video processing");

    store.mark_processing(&job.video_id).await?;

    let result = match run_attempt(store, inference, job, &logger).await {
        Ok(outcome) => store
            .mark_completed(&job.video_id)
            .await
            .map(|()| outcome),
        Err(e) => Err(e),
    };

    match result {
        Ok(outcome) => {
            counter!("cutsheet_runs_total", "outcome" => "completed").increment(1);
            logger.log_completion(&format!(
                "Montage sheet {} with {} entries",
                outcome.sheet_id, outcome.entries_count
            ));
            Ok(outcome)
        }
        Err(e) => {
            counter!("cutsheet_runs_total", "outcome" => "error").increment(1);
            logger.log_error(&format!("Processing failed: {}", e));

            // The record must not stay in `processing` whatever happened
            // above; this is the last chance to make that observable.
            if let Err(status_err) = store.mark_error(&job.video_id, &e.to_string()).await {
                error!(
                    video_id = %job.video_id,
                    error = %status_err,
                    "failed to record error status"
                );
            }
            Err(e)
        }
    }
}

/// Steps 2–4 of the state machine: inference, extraction, persistence.
async fn run_attempt(
    store: &dyn MontageStore,
    inference: &dyn InferenceService,
    job: &ProcessVideoJob,
    logger: &JobLogger,
) -> WorkerResult<ProcessOutcome> {
    let prompt = load_prompt_from_file().unwrap_or_else(|| MONTAGE_PROMPT.to_string());

    logger.log_progress("Requesting video analysis");
    let analysis = inference.analyze_video(&prompt, &job.video_url).await?;

    let extraction = extract_scenes(&analysis)?;
    logger.log_progress(&format!(
        "Extracted {} scenes via {:?} grammar",
        extraction.scenes.len(),
        extraction.strategy
    ));

    let video = store
        .get_video(&job.video_id)
        .await?
        .ok_or_else(|| WorkerError::VideoNotFound(job.video_id.clone()))?;

    let sheet = MontageSheet::new(job.video_id.clone(), video.user_id, DEFAULT_SHEET_TITLE);
    store.create_sheet(&sheet).await?;

    let entries = number_scenes(&sheet.sheet_id, &extraction.scenes);
    if let Err(insert_err) = store
        .insert_entries(&job.video_id, &sheet.sheet_id, &entries)
        .await
    {
        // Compensate: a sheet with no entries must not survive the run.
        if let Err(delete_err) = store.delete_sheet(&job.video_id, &sheet.sheet_id).await {
            error!(
                sheet_id = %sheet.sheet_id,
                error = %delete_err,
                "failed to delete orphaned sheet"
            );
        }
        return Err(insert_err);
    }

    info!(
        video_id = %job.video_id,
        sheet_id = %sheet.sheet_id,
        entries = entries.len(),
        "persisted montage sheet"
    );

    Ok(ProcessOutcome {
        sheet_id: sheet.sheet_id,
        entries_count: entries.len() as u32,
    })
}

/// Narrow view of the orchestrator used by callers that only need the
/// entry point and not the executor machinery.
pub async fn process(
    store: &dyn MontageStore,
    inference: &dyn InferenceService,
    video_id: VideoId,
    video_url: impl Into<String>,
) -> WorkerResult<ProcessOutcome> {
    let video = store
        .get_video(&video_id)
        .await?
        .ok_or_else(|| WorkerError::VideoNotFound(video_id.clone()))?;
    let job = ProcessVideoJob::new(video.user_id, video_id, video_url);
    process_video(store, inference, &job).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{MockInferenceService, MockMontageStore};
    use cutsheet_models::{VideoRecord, VideoStatus};
    use mockall::predicate::always;
    use mockall::Sequence;
    use std::sync::{Arc, Mutex};

    const ANALYSIS: &str =
        "**15:20 - 15:29**\n**Plan Medium:** Man enters room.\n**Dialogue:** \"Hello.\"\n\
**15:29 - 15:40**\n**Plan Wide:** Room empties.\n";

    fn job() -> ProcessVideoJob {
        ProcessVideoJob::new(
            "user-1",
            VideoId::from_string("vid-1"),
            "https://cdn.example/v.mp4",
        )
    }

    fn record() -> VideoRecord {
        VideoRecord::new(
            VideoId::from_string("vid-1"),
            "user-1",
            "https://cdn.example/v.mp4",
            "Clip",
        )
        .begin_processing()
    }

    fn inference_returning(text: &'static str) -> MockInferenceService {
        let mut inference = MockInferenceService::new();
        inference
            .expect_analyze_video()
            .returning(move |_, _| Ok(text.to_string()));
        inference
    }

    #[tokio::test]
    async fn test_success_path_completes_video() {
        let mut store = MockMontageStore::new();
        let mut seq = Sequence::new();

        store
            .expect_mark_processing()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        store
            .expect_get_video()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some(record())));
        store
            .expect_create_sheet()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        store
            .expect_insert_entries()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|_, _, entries| {
                entries.len() == 2
                    && entries[0].plan_number == 1
                    && entries[1].plan_number == 2
                    && entries[0].start_timecode == "00:15:20"
            })
            .returning(|_, _, _| Ok(()));
        store
            .expect_mark_completed()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        store.expect_mark_error().times(0);
        store.expect_delete_sheet().times(0);

        let outcome = process_video(&store, &inference_returning(ANALYSIS), &job())
            .await
            .unwrap();

        assert_eq!(outcome.entries_count, 2);
    }

    #[tokio::test]
    async fn test_inference_failure_marks_video_error() {
        let mut store = MockMontageStore::new();
        store.expect_mark_processing().returning(|_| Ok(()));
        store
            .expect_mark_error()
            .times(1)
            .withf(|_, message| message.contains("Inference failed"))
            .returning(|_, _| Ok(()));
        store.expect_mark_completed().times(0);
        store.expect_create_sheet().times(0);

        let mut inference = MockInferenceService::new();
        inference
            .expect_analyze_video()
            .returning(|_, _| Err(WorkerError::inference("provider returned 500")));

        let err = process_video(&store, &inference, &job()).await.unwrap_err();
        assert!(matches!(err, WorkerError::Inference(_)));
    }

    #[tokio::test]
    async fn test_unparsable_output_surfaces_no_scenes() {
        let mut store = MockMontageStore::new();
        store.expect_mark_processing().returning(|_| Ok(()));
        store
            .expect_mark_error()
            .times(1)
            .withf(|_, message| message.contains("no scenes"))
            .returning(|_, _| Ok(()));
        store.expect_get_video().times(0);
        store.expect_create_sheet().times(0);
        store.expect_mark_completed().times(0);

        let inference = inference_returning("nothing the grammars recognize");

        let err = process_video(&store, &inference, &job()).await.unwrap_err();
        assert!(err.is_no_scenes());
    }

    #[tokio::test]
    async fn test_entry_insert_failure_deletes_orphaned_sheet() {
        let created_sheet: Arc<Mutex<Option<SheetId>>> = Arc::new(Mutex::new(None));
        let deleted_sheet: Arc<Mutex<Option<SheetId>>> = Arc::new(Mutex::new(None));

        let mut store = MockMontageStore::new();
        store.expect_mark_processing().returning(|_| Ok(()));
        store.expect_get_video().returning(|_| Ok(Some(record())));

        let created = Arc::clone(&created_sheet);
        store.expect_create_sheet().times(1).returning(move |sheet| {
            *created.lock().unwrap() = Some(sheet.sheet_id.clone());
            Ok(())
        });

        store
            .expect_insert_entries()
            .times(1)
            .returning(|_, _, _| {
                Err(WorkerError::Persistence(
                    cutsheet_firestore::FirestoreError::request_failed("batch write failed"),
                ))
            });

        let deleted = Arc::clone(&deleted_sheet);
        store
            .expect_delete_sheet()
            .times(1)
            .returning(move |_, sheet_id| {
                *deleted.lock().unwrap() = Some(sheet_id.clone());
                Ok(())
            });

        store
            .expect_mark_error()
            .times(1)
            .withf(|_, message| message.contains("Persistence failed"))
            .returning(|_, _| Ok(()));
        store.expect_mark_completed().times(0);

        let err = process_video(&store, &inference_returning(ANALYSIS), &job())
            .await
            .unwrap_err();

        assert!(matches!(err, WorkerError::Persistence(_)));
        let created = created_sheet.lock().unwrap().clone().expect("sheet created");
        let deleted = deleted_sheet.lock().unwrap().clone().expect("sheet deleted");
        assert_eq!(created, deleted);
    }

    #[tokio::test]
    async fn test_missing_video_record_is_an_error_status() {
        let mut store = MockMontageStore::new();
        store.expect_mark_processing().returning(|_| Ok(()));
        store.expect_get_video().returning(|_| Ok(None));
        store
            .expect_mark_error()
            .times(1)
            .with(always(), always())
            .returning(|_, _| Ok(()));
        store.expect_create_sheet().times(0);

        let err = process_video(&store, &inference_returning(ANALYSIS), &job())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::VideoNotFound(_)));
    }

    #[tokio::test]
    async fn test_completion_write_failure_still_leaves_terminal_status() {
        let mut store = MockMontageStore::new();
        store.expect_mark_processing().returning(|_| Ok(()));
        store.expect_get_video().returning(|_| Ok(Some(record())));
        store.expect_create_sheet().returning(|_| Ok(()));
        store.expect_insert_entries().returning(|_, _, _| Ok(()));
        store.expect_mark_completed().times(1).returning(|_| {
            Err(WorkerError::Persistence(
                cutsheet_firestore::FirestoreError::request_failed("write timeout"),
            ))
        });
        store
            .expect_mark_error()
            .times(1)
            .returning(|_, _| Ok(()));

        let err = process_video(&store, &inference_returning(ANALYSIS), &job())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::Persistence(_)));
    }

    #[tokio::test]
    async fn test_status_update_failure_does_not_mask_root_cause() {
        let mut store = MockMontageStore::new();
        store.expect_mark_processing().returning(|_| Ok(()));
        store
            .expect_mark_error()
            .times(1)
            .returning(|_, _| {
                Err(WorkerError::Persistence(
                    cutsheet_firestore::FirestoreError::request_failed("store down"),
                ))
            });

        let mut inference = MockInferenceService::new();
        inference
            .expect_analyze_video()
            .returning(|_, _| Err(WorkerError::inference("timeout")));

        let err = process_video(&store, &inference, &job()).await.unwrap_err();
        assert!(matches!(err, WorkerError::Inference(_)));
    }

    #[test]
    fn test_prompt_names_the_format_contract() {
        assert!(MONTAGE_PROMPT.contains("**Plan"));
        for label in ["Voice-over", "Off-screen", "Dialogue", "Music"] {
            assert!(MONTAGE_PROMPT.contains(label), "missing cue label {}", label);
        }
    }
}
