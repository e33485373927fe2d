use crate::config::{default_progress_indicators, default_stage_timeout_secs};

use serde::{Deserialize, Serialize};

/// Application behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviourConfig {
    /// Type "Recording"/"Processing"/"Refining" into the target while a cycle runs.
    #[serde(default = "default_progress_indicators")]
    pub progress_indicators: bool,

    /// Limit for transcription and refinement, in seconds. 0 disables it.
    #[serde(default = "default_stage_timeout_secs")]
    pub stage_timeout_secs: u64,
}

impl Default for BehaviourConfig {
    fn default() -> Self {
        Self {
            progress_indicators: default_progress_indicators(),
            stage_timeout_secs: default_stage_timeout_secs(),
        }
    }
}
