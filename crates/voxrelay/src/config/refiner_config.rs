use crate::config::{default_program, default_system_prompt};

use serde::{Deserialize, Serialize};

/// External rephrasing tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinerConfig {
    /// Executable invoked as `program --print --system-prompt <prompt> -p <text>`.
    #[serde(default = "default_program")]
    pub program: String,

    /// Instructions passed to the tool with every request.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for RefinerConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            system_prompt: default_system_prompt(),
        }
    }
}
