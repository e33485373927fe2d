mod behaviour_config;
mod commands_config;
#[allow(clippy::module_inception)]
mod config;
mod hotkey_config;
mod refiner_config;
mod whisper_config;

pub(crate) use {
    behaviour_config::BehaviourConfig, commands_config::CommandsConfig, config::Config,
    hotkey_config::HotkeyConfig, refiner_config::RefinerConfig, whisper_config::WhisperConfig,
};

use voxrelay_core::{DEFAULT_CLIPBOARD_KEYWORDS, DEFAULT_REFINE_KEYWORDS, DEFAULT_STAGE_TIMEOUT};

pub(crate) const DEFAULT_MODEL_FILE: &str = "ggml-small.en.bin";
pub(crate) const DEFAULT_BINDING: &str = "control+shift+Space";
pub(crate) const DEFAULT_LANGUAGE: &str = "en";
pub(crate) const DEFAULT_REFINER_PROGRAM: &str = "claude";
pub(crate) const DEFAULT_SYSTEM_PROMPT: &str = "You are a text refinement assistant. When given \
    text, output ONLY the refined version without any explanation, formatting, or commentary. \
    Just return the improved text directly.";
pub(crate) const DEFAULT_PROGRESS_INDICATORS: bool = true;

pub(crate) fn default_use_gpu() -> bool {
    true
}

pub(crate) fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

pub(crate) fn default_binding() -> String {
    DEFAULT_BINDING.to_string()
}

pub(crate) fn default_refine_keywords() -> Vec<String> {
    DEFAULT_REFINE_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

pub(crate) fn default_clipboard_keywords() -> Vec<String> {
    DEFAULT_CLIPBOARD_KEYWORDS
        .iter()
        .map(|k| k.to_string())
        .collect()
}

pub(crate) fn default_program() -> String {
    DEFAULT_REFINER_PROGRAM.to_string()
}

pub(crate) fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

pub(crate) fn default_progress_indicators() -> bool {
    DEFAULT_PROGRESS_INDICATORS
}

pub(crate) fn default_stage_timeout_secs() -> u64 {
    DEFAULT_STAGE_TIMEOUT.as_secs()
}
