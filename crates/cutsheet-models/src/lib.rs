//! Shared data models for the Cutsheet backend.
//!
//! This crate provides Serde-serializable types for:
//! - Video lifecycle records and processing status
//! - Montage sheets and their ordered entries
//! - Ephemeral scenes produced by the extraction parsers
//! - Timecode normalization
//! - Job identifiers

pub mod job;
pub mod scene;
pub mod sheet;
pub mod timecode;
pub mod video;

// Re-export common types
pub use job::JobId;
pub use scene::Scene;
pub use sheet::{MontageEntry, MontageSheet, SheetId, DEFAULT_SHEET_TITLE};
pub use timecode::Timecode;
pub use video::{VideoId, VideoRecord, VideoStatus};
