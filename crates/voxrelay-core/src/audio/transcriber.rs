use crate::{
    CoreError, CoreResult,
    audio::{SttEngine, WHISPER_SAMPLE_RATE},
    collaborators::{CapturedAudio, Transcriber},
};

use std::{
    panic::Location,
    path::Path,
    sync::{Arc, Mutex},
    time::Instant,
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tracing::{info, instrument};

/// [`Transcriber`] backed by a local Whisper model.
///
/// Inference is CPU/GPU bound (1-10 seconds) and runs on the blocking pool
/// so the async worker thread stays free.
pub struct WhisperTranscriber {
    engine: Arc<Mutex<SttEngine>>,
}

impl WhisperTranscriber {
    /// Load the model at `model_path`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ModelNotFound`] if the file does not exist.
    #[track_caller]
    #[instrument(skip(model_path))]
    pub fn new<P: AsRef<Path>>(model_path: P, use_gpu: bool, language: &str) -> CoreResult<Self> {
        let engine = SttEngine::new(model_path, use_gpu, language)?;
        Ok(Self {
            engine: Arc::new(Mutex::new(engine)),
        })
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio: CapturedAudio) -> CoreResult<String> {
        if audio.sample_rate != WHISPER_SAMPLE_RATE {
            return Err(CoreError::TranscriptionFailed {
                source: format!(
                    "Expected {}Hz audio, got {}Hz",
                    WHISPER_SAMPLE_RATE, audio.sample_rate
                )
                .into(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let engine = Arc::clone(&self.engine);
        let start = Instant::now();

        let transcription = tokio::task::spawn_blocking(move || {
            let mut engine = engine.lock().unwrap_or_else(|e| e.into_inner());
            engine.transcribe(&audio.samples)
        })
        .await
        .map_err(|e| CoreError::TranscriptionFailed {
            source: Box::new(e),
            location: ErrorLocation::from(Location::caller()),
        })??;

        info!(
            duration_ms = start.elapsed().as_millis(),
            text_len = transcription.len(),
            "Transcription complete"
        );

        Ok(transcription)
    }
}
