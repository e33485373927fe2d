use crate::{
    CoreError, CoreResult,
    audio::{AudioCapturer, Resampler, WHISPER_SAMPLE_RATE},
    collaborators::{CapturedAudio, Recorder},
};

use std::{
    panic::Location,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tokio::task::JoinError;
use tracing::{debug, info, instrument};

/// Default-microphone [`Recorder`] that hands over 16kHz mono audio.
///
/// # Memory Footprint
///
/// At the maximum buffered duration (5 minutes at 48kHz) the capture buffer
/// holds ~58MB and the resampled copy ~19MB while `stop` runs.
///
/// Opening the stream, closing it and resampling run on the blocking pool,
/// so the calling task never stalls on the device or on Rubato.
pub struct MicrophoneRecorder {
    inner: Arc<Mutex<RecorderInner>>,
}

struct RecorderInner {
    capturer: AudioCapturer,
    resampler: Option<Resampler>,
}

impl MicrophoneRecorder {
    /// Open the default input device.
    ///
    /// # Errors
    ///
    /// Returns error if no input device is available or the resampler for
    /// its rate cannot be built.
    #[track_caller]
    #[instrument]
    pub fn new() -> CoreResult<Self> {
        let capturer = AudioCapturer::new()?;
        let sample_rate = capturer.sample_rate();

        let resampler = if sample_rate != WHISPER_SAMPLE_RATE {
            debug!(
                input_rate = sample_rate,
                output_rate = WHISPER_SAMPLE_RATE,
                "Resampler configured"
            );
            Some(Resampler::new(sample_rate, WHISPER_SAMPLE_RATE)?)
        } else {
            None
        };

        info!(sample_rate, "MicrophoneRecorder initialized");

        Ok(Self {
            inner: Arc::new(Mutex::new(RecorderInner {
                capturer,
                resampler,
            })),
        })
    }
}

// Recovering is safe: the capturer re-checks its own stream state.
fn lock(inner: &Mutex<RecorderInner>) -> MutexGuard<'_, RecorderInner> {
    inner.lock().unwrap_or_else(|e| e.into_inner())
}

#[track_caller]
fn blocking_task_failed(error: JoinError) -> CoreError {
    CoreError::DeviceError {
        reason: format!("Audio task panicked: {}", error),
        location: ErrorLocation::from(Location::caller()),
    }
}

#[async_trait]
impl Recorder for MicrophoneRecorder {
    async fn start(&self) -> CoreResult<()> {
        let inner = Arc::clone(&self.inner);

        tokio::task::spawn_blocking(move || lock(&inner).capturer.start())
            .await
            .map_err(blocking_task_failed)?
    }

    async fn stop(&self) -> CoreResult<CapturedAudio> {
        let inner = Arc::clone(&self.inner);

        tokio::task::spawn_blocking(move || {
            let mut inner = lock(&inner);
            let raw = inner.capturer.stop()?;

            let samples = match inner.resampler.as_mut() {
                Some(resampler) => resampler.resample(&raw)?,
                None => raw,
            };

            Ok(CapturedAudio::new(samples, WHISPER_SAMPLE_RATE))
        })
        .await
        .map_err(blocking_task_failed)?
    }

    fn is_active(&self) -> bool {
        lock(&self.inner).capturer.is_active()
    }
}
