//! Strategy dispatch and scene assembly.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use cutsheet_models::{MontageEntry, Scene, SheetId};

use crate::{fallback, primary};

/// Which grammar produced the extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStrategy {
    /// Emphasis-delimited markdown grammar
    Primary,
    /// Plain line-oriented grammar
    Fallback,
}

/// Outcome of the extraction stage: the scenes plus the grammar that
/// produced them.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub strategy: ParseStrategy,
    pub scenes: Vec<Scene>,
}

/// Extraction failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Both grammars produced zero scenes from the analysis text.
    #[error("no scenes could be extracted from the analysis text")]
    NoScenesExtracted,
}

/// Run the two grammars in fixed priority order.
///
/// The fallback grammar is consulted only when the primary grammar yields
/// zero scenes. Zero scenes from both is the single hard failure of the
/// extraction stage.
pub fn extract_scenes(text: &str) -> Result<Extraction, ParseError> {
    let scenes = primary::parse(text);
    if !scenes.is_empty() {
        info!(count = scenes.len(), "extracted scenes with primary grammar");
        return Ok(Extraction {
            strategy: ParseStrategy::Primary,
            scenes,
        });
    }

    debug!("primary grammar yielded no scenes, trying fallback");
    let scenes = fallback::parse(text);
    if scenes.is_empty() {
        return Err(ParseError::NoScenesExtracted);
    }

    info!(count = scenes.len(), "extracted scenes with fallback grammar");
    Ok(Extraction {
        strategy: ParseStrategy::Fallback,
        scenes,
    })
}

/// Assign stable ordering: `order_index` is the position in the sequence
/// and `plan_number` is `order_index + 1`, following source-text order.
pub fn number_scenes(sheet_id: &SheetId, scenes: &[Scene]) -> Vec<MontageEntry> {
    scenes
        .iter()
        .enumerate()
        .map(|(i, scene)| MontageEntry::from_scene(sheet_id.clone(), i as u32, scene))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPHASIZED: &str =
        "**15:20 - 15:29**\n**Plan Medium:** Man enters room.\n**Dialogue:** \"Hello.\"";
    const PLAIN: &str = "1:05 - 1:10\nPlan Close: Woman smiles.\nMusic: soft piano";

    #[test]
    fn test_primary_grammar_wins_when_it_matches() {
        let extraction = extract_scenes(EMPHASIZED).unwrap();
        assert_eq!(extraction.strategy, ParseStrategy::Primary);
        assert_eq!(extraction.scenes.len(), 1);
    }

    #[test]
    fn test_fallback_fires_only_on_empty_primary() {
        let extraction = extract_scenes(PLAIN).unwrap();
        assert_eq!(extraction.strategy, ParseStrategy::Fallback);
        assert_eq!(extraction.scenes[0].plan_type, "Close");
    }

    #[test]
    fn test_both_empty_is_the_single_hard_failure() {
        let err = extract_scenes("nothing recognizable here").unwrap_err();
        assert_eq!(err, ParseError::NoScenesExtracted);
    }

    #[test]
    fn test_numbering_is_dense_and_one_based() {
        let text = "\
**2:00 - 2:10**\n**Plan Wide:** Street.\n\
**1:00 - 1:05**\n**Plan Close:** Face.\n\
**3:00 - 3:30**\n**Plan Medium:** Door.\n";
        let extraction = extract_scenes(text).unwrap();
        let entries = number_scenes(&SheetId::new(), &extraction.scenes);

        let order: Vec<u32> = entries.iter().map(|e| e.order_index).collect();
        let plans: Vec<u32> = entries.iter().map(|e| e.plan_number).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert_eq!(plans, vec![1, 2, 3]);
        // Chronology of the timecodes does not reorder entries.
        assert_eq!(entries[1].start_timecode, "00:01:00");
    }
}
