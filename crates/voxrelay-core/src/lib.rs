//! voxrelay core library
//!
//! Turns a trigger (global hotkey or menu click) into one
//! record → transcribe → route cycle at a time. The pieces:
//!
//! - [`SessionStateMachine`]: `Idle`/`Recording`/`Processing` with atomic
//!   compare-and-set, plus the hotkey-enabled flag.
//! - [`TriggerDispatcher`] / [`TriggerWorker`]: coalescing admission queue
//!   and the single worker that runs cycles.
//! - [`SessionController`]: the cycle itself and enable/disable handling.
//! - [`CommandParser`] and [`ActionRouter`]: keyword routing of transcripts.
//! - [`MicrophoneRecorder`] and [`WhisperTranscriber`]: the audio
//!   collaborators, built on CPAL, Rubato and Whisper.
//!
//! # Example
//!
//! ```no_run
//! use voxrelay_core::{
//!     Collaborators, SessionController, SessionSettings, TriggerDispatcher, TriggerOrigin,
//! };
//!
//! use std::sync::Arc;
//!
//! async fn run(collaborators: Collaborators) {
//!     let controller = Arc::new(SessionController::new(
//!         collaborators,
//!         SessionSettings::default(),
//!     ));
//!     let (dispatcher, worker) = TriggerDispatcher::new(Arc::clone(&controller));
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//!     tokio::spawn(worker.run(shutdown_rx));
//!     dispatcher.submit(TriggerOrigin::Hotkey);
//! }
//! ```

mod audio;
mod collaborators;
mod command;
mod deadline;
mod dispatch;
mod error;
mod router;
mod session;

pub use {
    audio::{MicrophoneRecorder, WHISPER_SAMPLE_RATE, WhisperTranscriber},
    collaborators::{
        CapturedAudio, Feedback, NotificationSink, OutputSink, Recorder, TextRefiner, Transcriber,
        TriggerSource,
    },
    command::{
        Command, CommandParser, DEFAULT_CLIPBOARD_KEYWORDS, DEFAULT_REFINE_KEYWORDS, KeywordHits,
        ParsedCommand, SCAN_WINDOW,
    },
    dispatch::{
        ADMISSION_CAPACITY, Admission, Trigger, TriggerDispatcher, TriggerOrigin, TriggerWorker,
    },
    error::{CoreError, ErrorClass, Result as CoreResult},
    router::{ActionRouter, Delivery},
    session::{
        Collaborators, CycleFailure, CycleOutcome, DEFAULT_STAGE_TIMEOUT, MIN_RECORDING_DURATION,
        OUTPUT_FAILURE_MESSAGE, OUTPUT_FAILURE_TITLE, SessionController, SessionSettings,
        SessionState, SessionStateMachine, Stage,
    },
};

#[cfg(test)]
mod tests;
