//! Emphasis-delimited scene grammar.
//!
//! The instructional prompt asks the model for sections of the form:
//!
//! ```text
//! **15:20 - 15:29**
//! **Plan Medium:** Man enters room.
//! **Dialogue:** "Hello."
//! ```
//!
//! Each field is pulled out by its own pass returning an explicit
//! `Option`, so field assignment never depends on capture-group order.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use cutsheet_models::{Scene, Timecode};

/// Emphasized `**start - end**` range marker that opens a scene section.
static RANGE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*(\d{1,2}:\d{2}(?::\d{2})?\s*-\s*\d{1,2}:\d{2}(?::\d{2})?)\*\*")
        .expect("range marker regex")
});

/// Decomposes a captured range marker into its start/end timecodes.
static RANGE_PARTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2}:\d{2}(?::\d{2})?)\s*-\s*(\d{1,2}:\d{2}(?::\d{2})?)")
        .expect("range parts regex")
});

/// Emphasized `**Plan <type>:**` shot-classification marker.
static PLAN_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\*\*Plan\s+([^:\n]+):\*\*").expect("plan marker regex"));

/// Emphasized `**Label:**` marker opening a cue pair.
static LABEL_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^:\n]+):\*\*").expect("label marker regex"));

/// Leading bullet marker in a description.
static LEADING_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[*-]\s+").expect("bullet regex"));

/// Parse the full inference text with the emphasized grammar.
///
/// Returns scenes in input order. An empty result is not an error; it
/// signals that the fallback grammar should be tried.
pub fn parse(text: &str) -> Vec<Scene> {
    let mut scenes = Vec::new();

    let markers: Vec<_> = RANGE_MARKER.captures_iter(text).collect();

    for (i, caps) in markers.iter().enumerate() {
        let whole = caps.get(0).expect("match 0 always present");
        let timecode_raw = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();

        // Content runs until the next range marker or end of input.
        let content_start = whole.end();
        let content_end = markers
            .get(i + 1)
            .and_then(|c| c.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());
        let content = &text[content_start..content_end];

        match parse_section(timecode_raw, content) {
            Some(scene) => scenes.push(scene),
            None => debug!(marker = timecode_raw, "skipping undecodable scene section"),
        }
    }

    scenes
}

/// Parse one `(timecode, content)` section into a scene.
///
/// Returns `None` when the range marker does not decompose into two
/// timecodes; such sections are dropped, not errors.
fn parse_section(timecode_raw: &str, content: &str) -> Option<Scene> {
    let (start, end) = split_range(timecode_raw)?;

    let mut scene = Scene::open(timecode_raw, start, end);

    if let Some((plan_type, after_marker)) = plan_marker(content) {
        scene.plan_type = plan_type;
        scene.description = description_after(after_marker);
    }

    for (label, text) in cue_pairs(content) {
        scene.push_dialogue(&format!("{}: {}", label, text));
    }

    Some(scene)
}

/// Re-extract and normalize the two timecodes of a range marker.
pub(crate) fn split_range(timecode_raw: &str) -> Option<(Timecode, Timecode)> {
    let caps = RANGE_PARTS.captures(timecode_raw)?;
    let start = Timecode::normalize(caps.get(1)?.as_str());
    let end = Timecode::normalize(caps.get(2)?.as_str());
    Some((start, end))
}

/// Find the plan-type marker; returns the trimmed label and the content
/// remainder immediately after the marker.
fn plan_marker(content: &str) -> Option<(String, &str)> {
    let caps = PLAN_MARKER.captures(content)?;
    let whole = caps.get(0)?;
    let label = caps.get(1)?.as_str().trim().to_string();
    Some((label, &content[whole.end()..]))
}

/// Text following the plan marker, up to the next emphasized marker or the
/// end of the section, with a single leading bullet stripped.
fn description_after(rest: &str) -> String {
    let cut = rest.find("**").unwrap_or(rest.len());
    let description = rest[..cut].trim();
    LEADING_BULLET.replace(description, "").trim().to_string()
}

/// Every `**Label:** text` pair except the plan marker, in order of
/// appearance. The cue text runs to the next emphasized marker or end of
/// line, whichever comes first.
fn cue_pairs(content: &str) -> Vec<(String, String)> {
    LABEL_MARKER
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let label = caps.get(1)?.as_str().trim();
            if label.to_lowercase().starts_with("plan") {
                return None;
            }

            let rest = &content[whole.end()..];
            let marker_cut = rest.find("**").unwrap_or(rest.len());
            let line_cut = rest.find('\n').unwrap_or(rest.len());
            let text = rest[..marker_cut.min(line_cut)].trim();
            if text.is_empty() {
                return None;
            }
            Some((label.to_string(), text.to_string()))
        })
        .collect()
}
