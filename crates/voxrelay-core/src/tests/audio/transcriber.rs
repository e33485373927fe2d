use crate::{CapturedAudio, CoreError, Transcriber, WHISPER_SAMPLE_RATE, WhisperTranscriber};

/// WHAT: WhisperTranscriber surfaces a missing model at construction
/// WHY: The application must fail at startup, not on the first cycle
#[test]
fn given_missing_model_when_creating_transcriber_then_model_not_found_error() {
    // Given / When: Loading a model that does not exist
    let result = WhisperTranscriber::new("/nonexistent/model.bin", false, "en");

    // Then: ModelNotFound is returned
    assert!(matches!(result, Err(CoreError::ModelNotFound { .. })));
}

/// WHAT: Audio at the wrong rate is rejected before inference
/// WHY: Whisper silently produces garbage for non-16kHz input
#[tokio::test]
#[allow(clippy::unwrap_used)]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
async fn given_48khz_audio_when_transcribing_then_transcription_failed() {
    // Given: A loaded transcriber and 48kHz audio
    let model_path = std::env::var("TEST_WHISPER_MODEL_PATH")
        .unwrap_or_else(|_| "models/ggml-base.en.bin".to_string());
    let transcriber = WhisperTranscriber::new(model_path, false, "en").unwrap();
    let audio = CapturedAudio::new(vec![0.0; 48_000], WHISPER_SAMPLE_RATE * 3);

    // When: Transcribing
    let result = transcriber.transcribe(audio).await;

    // Then: The rate mismatch is reported
    assert!(matches!(result, Err(CoreError::TranscriptionFailed { .. })));
}
