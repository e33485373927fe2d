//! Keyword routing for finished transcripts.
//!
//! Only the first [`SCAN_WINDOW`] words are inspected, so the two keywords may
//! lead an utterance in either order while the same words later in normal
//! speech ("copy it to the clipboard") are left alone.

use tracing::debug;

/// Number of leading words inspected for keywords.
pub const SCAN_WINDOW: usize = 2;

/// Characters trimmed from both ends of a word before keyword comparison.
const PUNCTUATION: &[char] = &[
    '.', ',', '!', '?', ';', ':', '"', '\'', '(', ')', '[', ']', '{', '}',
];

/// Default rephrase keyword and the way Whisper most often mishears it.
pub const DEFAULT_REFINE_KEYWORDS: &[&str] = &["claude", "cloud"];

/// Default clipboard keyword.
pub const DEFAULT_CLIPBOARD_KEYWORDS: &[&str] = &["clipboard"];

/// Where the text of a cycle goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Type the transcript into the focused window.
    None,
    /// Copy the transcript to the clipboard.
    Clipboard,
    /// Rephrase, then type.
    Refine,
    /// Rephrase, then copy.
    RefineAndClipboard,
}

impl Command {
    /// Whether the refinement collaborator runs for this command.
    pub fn refines(self) -> bool {
        matches!(self, Command::Refine | Command::RefineAndClipboard)
    }

    /// Whether the result goes to the clipboard instead of being typed.
    pub fn copies(self) -> bool {
        matches!(self, Command::Clipboard | Command::RefineAndClipboard)
    }
}

/// Keywords found in the scan window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeywordHits {
    /// A rephrase keyword was found.
    pub refine: bool,
    /// A clipboard keyword was found.
    pub clipboard: bool,
}

impl KeywordHits {
    /// Routing decision for these hits.
    pub fn command(self) -> Command {
        match (self.refine, self.clipboard) {
            (false, false) => Command::None,
            (false, true) => Command::Clipboard,
            (true, false) => Command::Refine,
            (true, true) => Command::RefineAndClipboard,
        }
    }
}

/// A transcript with its routing decision and keyword-free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// What to do with `text`.
    pub command: Command,
    /// The transcript with keywords removed.
    pub text: String,
}

/// Stateless keyword parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandParser {
    refine_keywords: Vec<String>,
    clipboard_keywords: Vec<String>,
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new(DEFAULT_REFINE_KEYWORDS, DEFAULT_CLIPBOARD_KEYWORDS)
    }
}

impl CommandParser {
    /// Build a parser from keyword lists. Keywords are matched case-insensitively.
    pub fn new<R, C>(refine_keywords: R, clipboard_keywords: C) -> Self
    where
        R: IntoIterator,
        R::Item: AsRef<str>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        Self {
            refine_keywords: refine_keywords
                .into_iter()
                .map(|k| normalize_word(k.as_ref()))
                .filter(|k| !k.is_empty())
                .collect(),
            clipboard_keywords: clipboard_keywords
                .into_iter()
                .map(|k| normalize_word(k.as_ref()))
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Report which keywords appear among the first words of `transcript`.
    pub fn detect(&self, transcript: &str) -> KeywordHits {
        transcript
            .split_whitespace()
            .take(SCAN_WINDOW)
            .fold(KeywordHits::default(), |mut hits, word| {
                let word = normalize_word(word);
                hits.refine |= self.is_refine(&word);
                hits.clipboard |= self.is_clipboard(&word);
                hits
            })
    }

    /// Remove keyword words from the scan window and collapse whitespace.
    pub fn strip(&self, transcript: &str) -> String {
        transcript
            .split_whitespace()
            .enumerate()
            .filter(|(index, word)| *index >= SCAN_WINDOW || !self.is_keyword(word))
            .map(|(_, word)| word)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Decide the routing for `transcript`.
    ///
    /// Without keywords the transcript passes through unchanged.
    pub fn parse(&self, transcript: &str) -> ParsedCommand {
        let hits = self.detect(transcript);
        let command = hits.command();

        let text = match command {
            Command::None => transcript.to_string(),
            _ => self.strip(transcript),
        };

        debug!(
            refine = hits.refine,
            clipboard = hits.clipboard,
            command = ?command,
            "Keyword detection"
        );

        ParsedCommand { command, text }
    }

    fn is_keyword(&self, word: &str) -> bool {
        let word = normalize_word(word);
        self.is_refine(&word) || self.is_clipboard(&word)
    }

    fn is_refine(&self, normalized: &str) -> bool {
        self.refine_keywords.iter().any(|k| k == normalized)
    }

    fn is_clipboard(&self, normalized: &str) -> bool {
        self.clipboard_keywords.iter().any(|k| k == normalized)
    }
}

fn normalize_word(word: &str) -> String {
    word.trim_matches(PUNCTUATION).to_lowercase()
}
