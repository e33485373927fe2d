use crate::config::{default_clipboard_keywords, default_refine_keywords};

use serde::{Deserialize, Serialize};

/// Spoken keywords that route a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandsConfig {
    /// Words that send the transcript through the refiner.
    #[serde(default = "default_refine_keywords")]
    pub refine_keywords: Vec<String>,

    /// Words that send the result to the clipboard instead of typing it.
    #[serde(default = "default_clipboard_keywords")]
    pub clipboard_keywords: Vec<String>,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            refine_keywords: default_refine_keywords(),
            clipboard_keywords: default_clipboard_keywords(),
        }
    }
}
