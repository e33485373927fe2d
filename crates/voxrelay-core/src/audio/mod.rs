pub(crate) mod capture;
mod engine;
mod recorder;
mod resampler;
mod transcriber;

pub(crate) use {capture::AudioCapturer, engine::SttEngine, resampler::Resampler};

pub use {
    engine::WHISPER_SAMPLE_RATE, recorder::MicrophoneRecorder, transcriber::WhisperTranscriber,
};
