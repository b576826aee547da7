//! Line-oriented fallback scene grammar.
//!
//! Some model outputs drop the emphasis markers entirely and degrade into
//! plain lines:
//!
//! ```text
//! 1:05 - 1:10
//! Plan Close: Woman smiles.
//! Music: soft piano
//! ```
//!
//! This parser is consulted only when the primary grammar yields nothing.
//! A local accumulator holds the scene in progress and is flushed when a
//! new timecode line opens the next scene and once more at end of input.

use std::sync::LazyLock;

use regex::Regex;

use cutsheet_models::{Scene, Timecode};

/// `start - end` range at the beginning of a line.
static LINE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}:\d{2}(?::\d{2})?)\s*-\s*(\d{1,2}:\d{2}(?::\d{2})?)")
        .expect("line range regex")
});

/// `Plan <type>: rest` anywhere in a line.
static PLAN_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Plan\s+([^:\n]+):\s*(.*)").expect("plan line regex"));

/// Recognized dialogue/sound cue markers. These labels are a format
/// contract with the instructional prompt; the grammar breaks if they
/// drift.
const CUE_MARKERS: [&str; 4] = ["Voice-over:", "Off-screen:", "Dialogue:", "Music:"];

/// Parse the full inference text with the line-oriented grammar.
///
/// Same contract as the primary parser: scenes in input order, empty
/// result on total extraction failure, never an error.
pub fn parse(text: &str) -> Vec<Scene> {
    let mut scenes = Vec::new();
    let mut current: Option<Scene> = None;

    for line in text.lines() {
        let line = line.trim();

        if let Some(caps) = LINE_RANGE.captures(line) {
            flush(&mut current, &mut scenes);

            let start = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let end = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            current = Some(Scene::open(
                format!("{} - {}", start, end),
                Timecode::normalize(start),
                Timecode::normalize(end),
            ));
            continue;
        }

        if let Some(caps) = PLAN_LINE.captures(line) {
            if let Some(scene) = current.as_mut() {
                scene.plan_type = caps
                    .get(1)
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_default();
                scene.description = caps
                    .get(2)
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_default();
            }
            continue;
        }

        if CUE_MARKERS.iter().any(|marker| line.contains(marker)) {
            // Cue lines before the first timecode line are ignored.
            if let Some(scene) = current.as_mut() {
                scene.push_dialogue(line);
            }
        }
    }

    flush(&mut current, &mut scenes);
    scenes
}

/// Move the in-progress scene into the output if its start is usable.
fn flush(current: &mut Option<Scene>, scenes: &mut Vec<Scene>) {
    if let Some(scene) = current.take() {
        if scene.start.is_canonical() {
            scenes.push(scene);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_plain_scene() {
        let text = "1:05 - 1:10\nPlan Close: Woman smiles.\nMusic: soft piano";
        let scenes = parse(text);

        assert_eq!(scenes.len(), 1);
        let scene = &scenes[0];
        assert_eq!(scene.start.as_str(), "00:01:05");
        assert_eq!(scene.end.as_str(), "00:01:10");
        assert_eq!(scene.plan_type, "Close");
        assert_eq!(scene.description, "Woman smiles.");
        assert_eq!(scene.dialogues, "Music: soft piano");
    }

    #[test]
    fn test_timecode_line_flushes_previous_scene() {
        let text = "\
0:10 - 0:20\nPlan Wide: Street.\n\
0:21 - 0:30\nPlan Close: Face.\nDialogue: Hi.\n";
        let scenes = parse(text);

        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[0].plan_type, "Wide");
        assert!(scenes[0].dialogues.is_empty());
        assert_eq!(scenes[1].dialogues, "Dialogue: Hi.");
    }

    #[test]
    fn test_cues_before_first_scene_are_ignored() {
        let text = "Music: opening theme\n1:00 - 1:05\nPlan Wide: Field.";
        let scenes = parse(text);

        assert_eq!(scenes.len(), 1);
        assert!(scenes[0].dialogues.is_empty());
    }

    #[test]
    fn test_plan_line_overwrites_not_appends() {
        let text = "1:00 - 1:05\nPlan Wide: First take.\nPlan Close: Second take.";
        let scenes = parse(text);

        assert_eq!(scenes[0].plan_type, "Close");
        assert_eq!(scenes[0].description, "Second take.");
    }

    #[test]
    fn test_multiple_cue_lines_accumulate() {
        let text = "\
2:00 - 2:15\nPlan Medium: Cafe.\n\
Voice-over: She knew.\nOff-screen: (door slams)\nMusic: low drone\n";
        let scenes = parse(text);

        assert_eq!(
            scenes[0].dialogues,
            "Voice-over: She knew.\nOff-screen: (door slams)\nMusic: low drone"
        );
    }

    #[test]
    fn test_unrecognized_lines_are_dropped() {
        let text = "1:00 - 1:05\nPlan Wide: Field.\nSome stray commentary.\nNote: not a cue";
        let scenes = parse(text);

        assert_eq!(scenes[0].description, "Field.");
        assert!(scenes[0].dialogues.is_empty());
    }

    #[test]
    fn test_no_timecodes_returns_empty() {
        assert!(parse("no structure here at all").is_empty());
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_hour_form_and_indented_lines() {
        let text = "  1:02:03 - 1:02:30\n  Plan Wide: Skyline.";
        let scenes = parse(text);

        assert_eq!(scenes[0].start.as_str(), "01:02:03");
        assert_eq!(scenes[0].end.as_str(), "01:02:30");
    }
}
