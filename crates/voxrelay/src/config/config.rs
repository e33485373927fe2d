//! Configuration management for voxrelay.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, lazy validation, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{
        BehaviourConfig, CommandsConfig, DEFAULT_MODEL_FILE, HotkeyConfig, RefinerConfig,
        WhisperConfig, default_language, default_use_gpu,
    },
};

use voxrelay_core::CommandParser;

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
    time::Duration,
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Main configuration struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Whisper model configuration.
    pub whisper: WhisperConfig,
    /// Global hotkey.
    #[serde(default)]
    pub hotkey: HotkeyConfig,
    /// Routing keywords.
    #[serde(default)]
    pub commands: CommandsConfig,
    /// External rephrasing tool.
    #[serde(default)]
    pub refiner: RefinerConfig,
    /// Application behavior settings.
    #[serde(default)]
    pub behaviour: BehaviourConfig,
}

impl Config {
    /// Load configuration from the platform config directory, creating a
    /// default file if none exists.
    ///
    /// Note: This does NOT validate the model path exists. Call
    /// `validate_model_path()` before building the transcriber.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let dirs = Self::project_dirs()?;
        let config_dir = dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        let model_path = dirs.data_dir().join("models").join(DEFAULT_MODEL_FILE);
        Self::load_from(&config_dir.join("config.toml"), model_path)
    }

    /// Load configuration from `config_path`, writing defaults there first if
    /// the file does not exist. `default_model_path` is used only then.
    #[track_caller]
    #[instrument(skip(default_model_path))]
    pub fn load_from(config_path: &Path, default_model_path: PathBuf) -> AppResult<Self> {
        if !config_path.exists() {
            info!("No config found, creating default");
            let config = Self::with_model_path(default_model_path);
            config.save_to(config_path)?;

            warn!(
                model_path = ?config.whisper.model_path,
                "Default config created. Whisper model must be downloaded before recording."
            );
            return Ok(config);
        }

        let contents = fs::read_to_string(config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config = Self::parse(&contents)?;
        info!(config_path = ?config_path, "Configuration loaded");

        Ok(config)
    }

    /// Parse TOML text. Keywords are lower-cased and blank entries dropped.
    #[track_caller]
    pub fn parse(contents: &str) -> AppResult<Self> {
        let config: Config = toml::from_str(contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(config.normalized())
    }

    /// Defaults for every section, with the given model location.
    pub fn with_model_path(model_path: PathBuf) -> Self {
        Self {
            whisper: WhisperConfig {
                model_path,
                use_gpu: default_use_gpu(),
                language: default_language(),
            },
            hotkey: HotkeyConfig::default(),
            commands: CommandsConfig::default(),
            refiner: RefinerConfig::default(),
            behaviour: BehaviourConfig::default(),
        }
    }

    /// Validate that the Whisper model file exists at the configured path.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn validate_model_path(&self) -> AppResult<()> {
        if !self.whisper.model_path.exists() {
            return Err(AppError::ConfigError {
                reason: format!(
                    "Whisper model not found at: {:?}. Download a model or set whisper.model_path.",
                    self.whisper.model_path
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(())
    }

    /// Save configuration using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let temp_path = config_path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Keyword parser built from `[commands]`.
    pub fn command_parser(&self) -> CommandParser {
        CommandParser::new(
            &self.commands.refine_keywords,
            &self.commands.clipboard_keywords,
        )
    }

    /// Stage limit from `[behaviour]`; `None` when set to 0.
    pub fn stage_timeout(&self) -> Option<Duration> {
        match self.behaviour.stage_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Directory for the rotating log file.
    #[track_caller]
    pub fn log_dir() -> AppResult<PathBuf> {
        let dirs = Self::project_dirs()?;
        let log_dir = dirs.data_dir().join("logs");

        if !log_dir.exists() {
            fs::create_dir_all(&log_dir)?;
        }

        Ok(log_dir)
    }

    fn normalized(mut self) -> Self {
        let clean = |words: Vec<String>| -> Vec<String> {
            words
                .into_iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect()
        };

        self.commands.refine_keywords = clean(self.commands.refine_keywords);
        self.commands.clipboard_keywords = clean(self.commands.clipboard_keywords);
        self
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "voxrelay", "voxrelay").ok_or_else(|| AppError::ConfigError {
            reason: "Failed to get project directories".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}
