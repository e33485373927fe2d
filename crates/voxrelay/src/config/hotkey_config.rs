use crate::config::default_binding;

use serde::{Deserialize, Serialize};

/// Global hotkey configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotkeyConfig {
    /// Key combination such as `control+shift+Space` or `super+shift+KeyP`.
    #[serde(default = "default_binding")]
    pub binding: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            binding: default_binding(),
        }
    }
}
