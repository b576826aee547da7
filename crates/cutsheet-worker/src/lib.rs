//! Video processing orchestrator.
//!
//! Consumes [`cutsheet_queue::ProcessVideoJob`]s and drives each video
//! through one end-to-end attempt: inference call, scene extraction,
//! sheet persistence, status flip. A run always leaves the video in a
//! terminal `completed` or `error` status before it returns, whichever
//! step failed.

pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod processor;
pub mod services;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::JobExecutor;
pub use logging::JobLogger;
pub use processor::{process, process_video, ProcessOutcome, MONTAGE_PROMPT};
pub use services::{InferenceService, MontageStore};
