mod parser;

pub use parser::{
    Command, CommandParser, DEFAULT_CLIPBOARD_KEYWORDS, DEFAULT_REFINE_KEYWORDS, KeywordHits,
    ParsedCommand, SCAN_WINDOW,
};
