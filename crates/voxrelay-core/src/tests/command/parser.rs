use crate::{Command, CommandParser, KeywordHits};

/// WHAT: A transcript without keywords is typed unchanged
/// WHY: Ordinary dictation must reach the target exactly as recognized
#[test]
fn given_plain_transcript_when_parsing_then_typed_verbatim() {
    // Given: Transcript with punctuation and no keywords
    let parser = CommandParser::default();

    // When
    let parsed = parser.parse("Hello world, this is a test.");

    // Then: Command None and text untouched
    assert_eq!(parsed.command, Command::None);
    assert_eq!(parsed.text, "Hello world, this is a test.");
}

/// WHAT: Clipboard keyword in the first word routes to the clipboard
/// WHY: "Clipboard ..." is the spoken copy command
#[test]
fn given_clipboard_prefix_when_parsing_then_clipboard_and_keyword_removed() {
    let parsed = CommandParser::default().parse("Clipboard, meeting at three");

    assert_eq!(parsed.command, Command::Clipboard);
    assert_eq!(parsed.text, "meeting at three");
}

/// WHAT: Both keywords in either order combine into refine-and-copy
/// WHY: Users say "Claude clipboard" and "clipboard Claude" interchangeably
#[test]
fn given_both_keywords_in_either_order_when_parsing_then_refine_and_clipboard() {
    let parser = CommandParser::default();

    for transcript in ["Claude clipboard, fix this", "Clipboard. Claude! fix this"] {
        let parsed = parser.parse(transcript);
        assert_eq!(parsed.command, Command::RefineAndClipboard, "{}", transcript);
        assert_eq!(parsed.text, "fix this", "{}", transcript);
    }
}

/// WHAT: "cloud" is accepted as the rephrase keyword
/// WHY: Speech recognition frequently mishears "Claude"
#[test]
fn given_cloud_prefix_when_parsing_then_refine() {
    let parsed = CommandParser::default().parse("CLOUD: make this polite");

    assert_eq!(parsed.command, Command::Refine);
    assert_eq!(parsed.text, "make this polite");
}

/// WHAT: Keywords beyond the second word are ignored
/// WHY: Normal speech mentioning the clipboard must not trigger a copy
#[test]
fn given_keyword_in_third_position_when_parsing_then_no_command() {
    let parsed = CommandParser::default().parse("please put clipboard contents here");

    assert_eq!(parsed.command, Command::None);
    assert_eq!(parsed.text, "please put clipboard contents here");
}

/// WHAT: Only keywords inside the scan window are stripped
/// WHY: A later "Claude" is part of the message, not a command
#[test]
fn given_keyword_repeated_later_when_parsing_then_later_occurrence_kept() {
    let parsed = CommandParser::default().parse("Claude ask Claude about it");

    assert_eq!(parsed.command, Command::Refine);
    assert_eq!(parsed.text, "ask Claude about it");
}

/// WHAT: Stripping collapses runs of whitespace
/// WHY: Removing a keyword must not leave a leading or double space
#[test]
fn given_irregular_spacing_when_stripping_then_single_spaces() {
    let text = CommandParser::default().strip("  clipboard   one\ttwo  ");

    assert_eq!(text, "one two");
}

/// WHAT: A keyword-only utterance yields empty text
/// WHY: The controller treats this as nothing to deliver
#[test]
fn given_only_keywords_when_parsing_then_empty_text() {
    let parsed = CommandParser::default().parse("Claude, clipboard.");

    assert_eq!(parsed.command, Command::RefineAndClipboard);
    assert!(parsed.text.is_empty());
}

/// WHAT: Punctuation glued to a word does not hide a keyword
/// WHY: Whisper attaches commas and quotes to the first word
#[test]
fn given_wrapped_keyword_when_detecting_then_hit() {
    let hits = CommandParser::default().detect("(\"Clipboard\") hello");

    assert_eq!(
        hits,
        KeywordHits {
            refine: false,
            clipboard: true
        }
    );
}

/// WHAT: Custom keyword lists replace the defaults, case-insensitively
/// WHY: Keywords come from the configuration file
#[test]
fn given_custom_keywords_when_parsing_then_only_custom_words_match() {
    // Given: "Polish" refines, "Copy" copies
    let parser = CommandParser::new(["Polish"], ["COPY"]);

    // When
    let custom = parser.parse("copy polish the draft");
    let default_word = parser.parse("Claude the draft");

    // Then
    assert_eq!(custom.command, Command::RefineAndClipboard);
    assert_eq!(custom.text, "the draft");
    assert_eq!(default_word.command, Command::None);
}

/// WHAT: Each command reports refine and copy independently
/// WHY: The router uses these to pick refine-then-type or refine-then-copy
#[test]
fn given_each_command_when_queried_then_flags_match() {
    assert!(!Command::None.refines() && !Command::None.copies());
    assert!(!Command::Clipboard.refines() && Command::Clipboard.copies());
    assert!(Command::Refine.refines() && !Command::Refine.copies());
    assert!(Command::RefineAndClipboard.refines() && Command::RefineAndClipboard.copies());
}

/// WHAT: Detection looks at the first two words only
/// WHY: "claude" later in a sentence is ordinary speech
#[test]
fn given_keyword_position_when_detecting_then_only_leading_words_count() {
    let parser = CommandParser::default();

    assert!(parser.detect("claude rephrase this").refine);
    assert!(!parser.detect("one two claude three").refine);
}

/// WHAT: Strip removes exactly the matched leading keywords
/// WHY: The remaining words must be delivered intact and in order
#[test]
fn given_leading_keywords_when_stripping_then_remainder_kept() {
    let parser = CommandParser::default();

    assert_eq!(
        parser.strip("claude clipboard this is a test"),
        "this is a test"
    );
    assert_eq!(parser.strip("Clipboard, copy this text"), "copy this text");
}
