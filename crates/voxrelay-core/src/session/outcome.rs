use crate::{ErrorClass, router::Delivery};

use std::{fmt, time::Duration};

/// Step of a cycle that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Starting the microphone.
    StartRecording,
    /// Stopping the microphone and collecting audio.
    StopRecording,
    /// Speech recognition.
    Transcription,
    /// Refinement or delivery of the text.
    Routing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::StartRecording => write!(f, "start recording"),
            Stage::StopRecording => write!(f, "stop recording"),
            Stage::Transcription => write!(f, "transcription"),
            Stage::Routing => write!(f, "routing"),
        }
    }
}

/// The most recent failed stage, kept until the next recording starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleFailure {
    /// The failing stage.
    pub stage: Stage,
    /// How the failure was surfaced.
    pub class: ErrorClass,
}

/// Result of one cycle-handler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The hotkey is disabled; nothing happened.
    Disabled,
    /// A cycle is already processing; the trigger was ignored.
    Busy,
    /// Another caller moved the state first; nothing happened.
    Superseded,
    /// The microphone is now capturing.
    RecordingStarted,
    /// The recording was shorter than the minimum and was discarded.
    TooShort {
        /// Length of the discarded recording.
        duration: Duration,
    },
    /// The transcript was empty.
    NoSpeech,
    /// Only keywords were spoken; there was no text to deliver.
    NothingToDeliver,
    /// Text reached the user.
    Delivered(Delivery),
    /// A stage failed and the cycle was abandoned.
    Failed {
        /// The failing stage.
        stage: Stage,
        /// How the failure was surfaced.
        class: ErrorClass,
    },
}

impl CycleOutcome {
    /// Whether the cycle went through `Processing`, as opposed to returning
    /// before doing any work or just starting a recording.
    pub fn processed(&self) -> bool {
        match self {
            CycleOutcome::Disabled
            | CycleOutcome::Busy
            | CycleOutcome::Superseded
            | CycleOutcome::RecordingStarted => false,
            CycleOutcome::Failed { stage, .. } => *stage != Stage::StartRecording,
            CycleOutcome::TooShort { .. }
            | CycleOutcome::NoSpeech
            | CycleOutcome::NothingToDeliver
            | CycleOutcome::Delivered(_) => true,
        }
    }
}
