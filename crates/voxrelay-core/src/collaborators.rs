//! Interfaces between the session core and the outside world.
//!
//! The controller only talks to audio hardware, the recognition engine, the
//! refinement tool, the desktop and the hotkey system through these traits.

use crate::CoreResult;

use std::time::Duration;

use async_trait::async_trait;

/// Mono audio handed from the recorder to the transcriber.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapturedAudio {
    /// Mono samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    /// Samples per second of `samples`.
    pub sample_rate: u32,
}

impl CapturedAudio {
    /// Wrap samples recorded at `sample_rate`.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Length of the recording.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / f64::from(self.sample_rate))
    }

    /// Peak absolute amplitude and mean square level.
    pub fn levels(&self) -> (f32, f32) {
        if self.samples.is_empty() {
            return (0.0, 0.0);
        }
        let mut peak = 0.0f32;
        let mut sum_squared = 0.0f64;
        for &sample in &self.samples {
            peak = peak.max(sample.abs());
            sum_squared += f64::from(sample) * f64::from(sample);
        }
        (peak, (sum_squared / self.samples.len() as f64) as f32)
    }
}

/// Progress text shown in the target window while a cycle runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    /// Microphone is capturing.
    Recording,
    /// Audio is being transcribed.
    Processing,
    /// Transcript is being rephrased.
    Refining,
}

impl Feedback {
    /// The text typed into the target for this indicator.
    pub fn label(self) -> &'static str {
        match self {
            Feedback::Recording => "Recording",
            Feedback::Processing => "Processing",
            Feedback::Refining => "Refining",
        }
    }
}

/// Microphone capture.
#[async_trait]
pub trait Recorder: Send + Sync {
    /// Begin capturing. Fails if already capturing.
    async fn start(&self) -> CoreResult<()>;

    /// Stop capturing and hand over everything captured since `start`.
    async fn stop(&self) -> CoreResult<CapturedAudio>;

    /// Whether a capture is running.
    fn is_active(&self) -> bool;
}

/// Speech recognition.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Turn captured audio into text. May return an empty string for silence.
    async fn transcribe(&self, audio: CapturedAudio) -> CoreResult<String>;
}

/// Rephrasing of a transcript by an external tool.
#[async_trait]
pub trait TextRefiner: Send + Sync {
    /// Return the refined version of `text`.
    async fn refine(&self, text: &str) -> CoreResult<String>;
}

/// Delivery of text to the user's desktop.
///
/// Each method resolves only once the effect has completed, so callers can
/// sequence operations without sleeping.
#[async_trait]
pub trait OutputSink: Send + Sync {
    /// Insert `text` into the focused window.
    async fn type_text(&self, text: &str) -> CoreResult<()>;

    /// Replace the clipboard contents with `text`.
    async fn copy_to_clipboard(&self, text: &str) -> CoreResult<()>;

    /// Current clipboard contents.
    async fn read_clipboard(&self) -> CoreResult<String>;

    /// Show a progress indicator, replacing any indicator already shown.
    async fn show_feedback(&self, feedback: Feedback) -> CoreResult<()>;

    /// Remove the current progress indicator, if any.
    async fn clear_feedback(&self) -> CoreResult<()>;
}

/// The system-level trigger (global hotkey) registration.
#[async_trait]
pub trait TriggerSource: Send + Sync {
    /// Start delivering trigger notifications.
    async fn register(&self) -> CoreResult<()>;

    /// Stop delivering trigger notifications.
    async fn unregister(&self) -> CoreResult<()>;
}

/// User-visible error reporting.
pub trait NotificationSink: Send + Sync {
    /// Show an error to the user.
    fn show_error(&self, title: &str, message: &str);
}
