use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use thiserror::Error;

/// Errors raised by the session core and its collaborators, with source
/// location tracking.
#[derive(Error, Debug)]
pub enum CoreError {
    /// No audio input device found.
    #[error("No microphone found {location}")]
    NoMicrophoneFound {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Whisper model file not found at specified path.
    #[error("Model not found at path: {path:?} {location}")]
    ModelNotFound {
        /// Path to the missing model file.
        path: std::path::PathBuf,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Transcription process failed.
    #[error("Transcription failed: {source} {location}")]
    TranscriptionFailed {
        /// Underlying error from the recognition engine.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No audio data captured or provided.
    #[error("No audio captured {location}")]
    NoAudioCaptured {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio device operation failed.
    #[error("Audio device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio resampling failed.
    #[error("Resampling error: {reason} {location}")]
    ResamplingError {
        /// Description of the resampling error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// `start` was called while a capture is already running.
    #[error("Recorder is already recording {location}")]
    AlreadyRecording {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// `stop` was called without a running capture.
    #[error("Recorder is not recording {location}")]
    NotRecording {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The text refinement collaborator failed or returned nothing.
    #[error("Refinement failed: {reason} {location}")]
    RefinementFailed {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Typing into the target or writing the clipboard failed.
    #[error("Output failed: {reason} {location}")]
    OutputFailed {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Registering or unregistering the trigger source failed.
    #[error("Trigger source error: {reason} {location}")]
    TriggerSourceFailed {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A cycle stage did not finish within the configured limit.
    #[error("{stage} timed out after {timeout:?} {location}")]
    StageTimedOut {
        /// Name of the stage that timed out.
        stage: &'static str,
        /// The limit that was exceeded.
        timeout: Duration,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// How a failed cycle is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Logged, state reset, nothing shown to the user.
    Recoverable,
    /// Logged, state reset, and reported through the notification sink.
    UserActionable,
}

impl CoreError {
    /// Classify this error for cycle failure handling.
    ///
    /// Output failures are usually a missing accessibility/automation
    /// permission the user can grant, so they are the only class that
    /// reaches the notification sink.
    pub fn class(&self) -> ErrorClass {
        match self {
            CoreError::OutputFailed { .. } => ErrorClass::UserActionable,
            _ => ErrorClass::Recoverable,
        }
    }

    /// Shorthand for [`CoreError::OutputFailed`] at the caller's location.
    #[track_caller]
    pub fn output(reason: impl Into<String>) -> Self {
        CoreError::OutputFailed {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Shorthand for [`CoreError::RefinementFailed`] at the caller's location.
    #[track_caller]
    pub fn refinement(reason: impl Into<String>) -> Self {
        CoreError::RefinementFailed {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Shorthand for [`CoreError::TriggerSourceFailed`] at the caller's location.
    #[track_caller]
    pub fn trigger_source(reason: impl Into<String>) -> Self {
        CoreError::TriggerSourceFailed {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
