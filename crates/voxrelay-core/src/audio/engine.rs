use crate::{CoreError, CoreResult};

use std::{panic::Location, path::Path};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Sample rate Whisper models expect.
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// A loaded Whisper model.
pub struct SttEngine {
    ctx: WhisperContext,
    language: String,
}

impl SttEngine {
    #[track_caller]
    #[instrument(skip(model_path))]
    pub fn new<P: AsRef<Path>>(model_path: P, use_gpu: bool, language: &str) -> CoreResult<Self> {
        let path = model_path.as_ref();

        if !path.exists() {
            return Err(CoreError::ModelNotFound {
                path: path.to_path_buf(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut params = WhisperContextParameters::default();
        params.use_gpu(use_gpu);

        let ctx = WhisperContext::new_with_params(
            path.to_str().ok_or(CoreError::ModelNotFound {
                path: path.to_path_buf(),
                location: ErrorLocation::from(Location::caller()),
            })?,
            params,
        )
        .map_err(|e| CoreError::TranscriptionFailed {
            source: Box::new(e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(model_path = ?path, use_gpu, language, "Whisper model loaded");

        Ok(Self {
            ctx,
            language: language.to_string(),
        })
    }

    /// Transcribe 16kHz mono samples, joining trimmed segments with spaces.
    #[track_caller]
    #[instrument(skip(self, samples))]
    pub fn transcribe(&mut self, samples: &[f32]) -> CoreResult<String> {
        if samples.is_empty() {
            return Err(CoreError::NoAudioCaptured {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });

        params.set_language(Some(&self.language));
        params.set_print_progress(false);
        params.set_print_special(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_suppress_blank(true);
        params.set_suppress_nst(true);

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| CoreError::TranscriptionFailed {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        state
            .full(params, samples)
            .map_err(|e| CoreError::TranscriptionFailed {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let num_segments = state.full_n_segments();
        let mut segments = Vec::with_capacity(num_segments.max(0) as usize);

        for i in 0..num_segments {
            let segment = state
                .get_segment(i)
                .ok_or_else(|| CoreError::TranscriptionFailed {
                    source: format!("Failed to get segment {}", i).into(),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            let text = segment.to_string();
            let text = text.trim();
            if !text.is_empty() {
                segments.push(text.to_string());
            }
        }

        let transcription = segments.join(" ");

        debug!(
            sample_count = samples.len(),
            segment_count = num_segments,
            text_len = transcription.len(),
            "Transcription complete"
        );

        Ok(transcription)
    }
}
