//! Montage sheets and their ordered entries.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::scene::Scene;
use crate::video::VideoId;

/// Unique identifier for a montage sheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SheetId(pub String);

impl SheetId {
    /// Generate a new random sheet ID.
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

impl Default for SheetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The persisted collection of ordered scenes for one video.
///
/// One sheet per successful run; re-processing a video creates a new
/// sheet and leaves earlier ones in place.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MontageSheet {
    /// Unique sheet ID
    pub sheet_id: SheetId,
    /// Owning video
    pub video_id: VideoId,
    /// Owning user
    pub user_id: String,
    /// Display title
    pub title: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Default title for a freshly generated sheet.
pub const DEFAULT_SHEET_TITLE: &str = "Montage sheet";

impl MontageSheet {
    /// Create a new sheet for a video.
    pub fn new(video_id: VideoId, user_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            sheet_id: SheetId::new(),
            video_id,
            user_id: user_id.into(),
            title: title.into(),
            created_at: Utc::now(),
        }
    }
}

/// One row of a montage sheet.
///
/// Created only by the orchestrator after a successful extraction and
/// never mutated afterward. `plan_number` is always `order_index + 1`,
/// maintained by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MontageEntry {
    /// Owning sheet
    pub sheet_id: SheetId,
    /// 1-based sequential shot number
    pub plan_number: u32,
    /// Canonical start timecode
    pub start_timecode: String,
    /// Canonical end timecode
    pub end_timecode: String,
    /// Shot classification label
    pub plan_type: String,
    /// Visual description
    pub description: String,
    /// Dialogue/sound cues, newline-joined
    pub dialogues: String,
    /// 0-based position in the sheet
    pub order_index: u32,
}

impl MontageEntry {
    /// Build an entry from an extracted scene at the given position.
    pub fn from_scene(sheet_id: SheetId, order_index: u32, scene: &Scene) -> Self {
        Self {
            sheet_id,
            plan_number: order_index + 1,
            start_timecode: scene.start.as_str().to_string(),
            end_timecode: scene.end.as_str().to_string(),
            plan_type: scene.plan_type.clone(),
            description: scene.description.clone(),
            dialogues: scene.dialogues.clone(),
            order_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timecode::Timecode;

    fn scene(start: &str, end: &str) -> Scene {
        Scene::open(
            format!("{} - {}", start, end),
            Timecode::normalize(start),
            Timecode::normalize(end),
        )
    }

    #[test]
    fn test_entry_numbering_follows_position() {
        let sheet_id = SheetId::new();
        let scenes = [scene("15:20", "15:29"), scene("2:00", "2:10"), scene("1:00", "1:05")];

        let entries: Vec<MontageEntry> = scenes
            .iter()
            .enumerate()
            .map(|(i, s)| MontageEntry::from_scene(sheet_id.clone(), i as u32, s))
            .collect();

        // Position in the source wins even when timecodes are out of order.
        assert_eq!(entries[0].order_index, 0);
        assert_eq!(entries[0].plan_number, 1);
        assert_eq!(entries[2].order_index, 2);
        assert_eq!(entries[2].plan_number, 3);
        assert_eq!(entries[2].start_timecode, "00:01:00");
    }

    #[test]
    fn test_sheet_ids_are_unique() {
        assert_ne!(SheetId::new(), SheetId::new());
    }
}
