//! End-to-end extraction scenarios over realistic inference output.

use cutsheet_models::SheetId;
use cutsheet_parser::{extract_scenes, number_scenes, ParseError, ParseStrategy};

#[test]
fn emphasized_output_parses_into_one_scene() {
    let text = "**15:20 - 15:29**\n**Plan Medium:** Man enters room.\n**Dialogue:** \"Hello.\"";

    let extraction = extract_scenes(text).unwrap();
    assert_eq!(extraction.strategy, ParseStrategy::Primary);

    let scene = &extraction.scenes[0];
    assert_eq!(scene.start.as_str(), "00:15:20");
    assert_eq!(scene.end.as_str(), "00:15:29");
    assert_eq!(scene.plan_type, "Medium");
    assert_eq!(scene.description, "Man enters room.");
    assert_eq!(scene.dialogues, "Dialogue: \"Hello.\"");
}

#[test]
fn plain_output_falls_back_to_line_grammar() {
    let text = "1:05 - 1:10\nPlan Close: Woman smiles.\nMusic: soft piano";

    let extraction = extract_scenes(text).unwrap();
    assert_eq!(extraction.strategy, ParseStrategy::Fallback);

    let scene = &extraction.scenes[0];
    assert_eq!(scene.start.as_str(), "00:01:05");
    assert_eq!(scene.end.as_str(), "00:01:10");
    assert_eq!(scene.plan_type, "Close");
    assert_eq!(scene.description, "Woman smiles.");
    assert_eq!(scene.dialogues, "Music: soft piano");
}

#[test]
fn unrecognizable_text_fails_extraction() {
    let text = "The video shows a lively street market with many colorful stalls.";
    assert_eq!(extract_scenes(text).unwrap_err(), ParseError::NoScenesExtracted);
}

#[test]
fn consecutive_scenes_number_in_source_order() {
    let text = "\
**0:45 - 0:52**\n**Plan Wide:** Harbor at dawn.\n**Music:** gulls\n\
**0:12 - 0:20**\n**Plan Close:** Rope on a cleat.\n\
**1:30 - 1:41**\n**Plan Medium:** Skipper checks charts.\n**Voice-over:** Day three.\n";

    let extraction = extract_scenes(text).unwrap();
    let entries = number_scenes(&SheetId::new(), &extraction.scenes);

    assert_eq!(entries.len(), 3);
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.order_index, i as u32);
        assert_eq!(entry.plan_number, i as u32 + 1);
    }
    // Source order is authoritative even though 0:12 precedes 0:45.
    assert_eq!(entries[0].start_timecode, "00:00:45");
    assert_eq!(entries[1].start_timecode, "00:00:12");
}

#[test]
fn mixed_noise_around_valid_sections_is_tolerated() {
    let text = "\
Here is the montage breakdown you asked for.\n\n\
**0:00 - 0:08**\n**Plan Wide:** Title card over black.\n\
Some unstructured commentary the model added.\n\
**0:08 - 0:15**\n**Plan Close:** Hands typing.\n**Off-screen:** keyboard clatter\n\
That's all I could identify.\n";

    let extraction = extract_scenes(text).unwrap();
    assert_eq!(extraction.strategy, ParseStrategy::Primary);
    assert_eq!(extraction.scenes.len(), 2);
    assert_eq!(extraction.scenes[1].dialogues, "Off-screen: keyboard clatter");
}
