//! Ephemeral scene extracted by the parsers.

use serde::{Deserialize, Serialize};

use crate::timecode::Timecode;

/// One extracted shot/segment, before it is numbered and persisted.
///
/// `start`/`end` are canonical `HH:MM:SS` timecodes; ordering is the
/// position of extraction in the source text, never a sort of the
/// timecodes themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    /// The raw range marker as it appeared in the source text
    pub timecode_raw: String,
    /// Normalized start timecode
    pub start: Timecode,
    /// Normalized end timecode
    pub end: Timecode,
    /// Shot classification label (e.g. "Close", "Medium"); empty if absent
    pub plan_type: String,
    /// Visual description of the shot
    pub description: String,
    /// Dialogue/sound cues, one `Label: text` per line
    pub dialogues: String,
}

impl Scene {
    /// Create a scene with empty plan/description/dialogues.
    pub fn open(timecode_raw: impl Into<String>, start: Timecode, end: Timecode) -> Self {
        Self {
            timecode_raw: timecode_raw.into(),
            start,
            end,
            plan_type: String::new(),
            description: String::new(),
            dialogues: String::new(),
        }
    }

    /// Append a cue line to `dialogues`, newline-joined.
    pub fn push_dialogue(&mut self, line: &str) {
        if !self.dialogues.is_empty() {
            self.dialogues.push('\n');
        }
        self.dialogues.push_str(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_dialogue_joins_with_newlines() {
        let mut scene = Scene::open(
            "1:05 - 1:10",
            Timecode::normalize("1:05"),
            Timecode::normalize("1:10"),
        );
        scene.push_dialogue("Music: soft piano");
        scene.push_dialogue("Dialogue: \"Hello.\"");
        assert_eq!(scene.dialogues, "Music: soft piano\nDialogue: \"Hello.\"");
    }
}
