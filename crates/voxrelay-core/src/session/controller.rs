//! Orchestration of one record → transcribe → route cycle.
//!
//! The controller owns the state machine and explicit handles to every
//! collaborator. Each call to [`SessionController::handle_trigger`] either
//! starts a recording or finishes one, and every path that reaches
//! `Recording` or `Processing` ends back in `Idle`.

use crate::{
    CoreError, CoreResult, ErrorClass,
    collaborators::{
        Feedback, NotificationSink, OutputSink, Recorder, TextRefiner, Transcriber, TriggerSource,
    },
    command::CommandParser,
    deadline::within,
    router::ActionRouter,
    session::{CycleFailure, CycleOutcome, SessionState, SessionStateMachine, Stage},
};

use std::{sync::Arc, time::Duration};

use tokio::sync::{Mutex, watch};
use tracing::{Instrument, debug, error, info, info_span, instrument, warn};
use uuid::Uuid;

/// Recordings shorter than this are discarded without transcription.
pub const MIN_RECORDING_DURATION: Duration = Duration::from_millis(500);

/// Default limit for transcription and refinement.
pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(120);

/// Title of the notification shown when output fails.
pub const OUTPUT_FAILURE_TITLE: &str = "Accessibility Permission Required";

/// Body of the notification shown when output fails.
pub const OUTPUT_FAILURE_MESSAGE: &str = "voxrelay could not type or copy the transcription.\n\n\
     Grant accessibility (input automation) permission to the terminal or \
     application running voxrelay, then trigger the hotkey again.";

/// Every external dependency of the controller.
pub struct Collaborators {
    /// Microphone capture.
    pub recorder: Arc<dyn Recorder>,
    /// Speech recognition.
    pub transcriber: Arc<dyn Transcriber>,
    /// Transcript rephrasing.
    pub refiner: Arc<dyn TextRefiner>,
    /// Typing, clipboard and progress indicators.
    pub output: Arc<dyn OutputSink>,
    /// Global hotkey registration.
    pub trigger_source: Arc<dyn TriggerSource>,
    /// User-facing error reports.
    pub notifier: Arc<dyn NotificationSink>,
}

/// Tunables for the controller.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Keyword parser applied to every transcript.
    pub parser: CommandParser,
    /// Limit applied to transcription and refinement. `None` waits forever.
    pub stage_timeout: Option<Duration>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            parser: CommandParser::default(),
            stage_timeout: Some(DEFAULT_STAGE_TIMEOUT),
        }
    }
}

/// Failure of one stage, carried to the single reporting point.
struct StageFailure {
    stage: Stage,
    error: CoreError,
}

/// Drives the dictation cycle.
pub struct SessionController {
    state: SessionStateMachine,
    recorder: Arc<dyn Recorder>,
    transcriber: Arc<dyn Transcriber>,
    output: Arc<dyn OutputSink>,
    trigger_source: Arc<dyn TriggerSource>,
    notifier: Arc<dyn NotificationSink>,
    router: ActionRouter,
    parser: CommandParser,
    stage_timeout: Option<Duration>,
    failures: watch::Sender<Option<CycleFailure>>,
    /// Serializes enable/disable against starting and stopping a recording.
    /// Never held while a cycle is processing.
    gate: Mutex<()>,
}

impl SessionController {
    /// Create a controller in `Idle` with the hotkey enabled.
    pub fn new(collaborators: Collaborators, settings: SessionSettings) -> Self {
        let Collaborators {
            recorder,
            transcriber,
            refiner,
            output,
            trigger_source,
            notifier,
        } = collaborators;

        let router = ActionRouter::new(refiner, Arc::clone(&output), settings.stage_timeout);

        Self {
            state: SessionStateMachine::new(),
            recorder,
            transcriber,
            output,
            trigger_source,
            notifier,
            router,
            parser: settings.parser,
            stage_timeout: settings.stage_timeout,
            failures: watch::Sender::new(None),
            gate: Mutex::new(()),
        }
    }

    /// The session state machine.
    pub fn state(&self) -> &SessionStateMachine {
        &self.state
    }

    /// Receive the last failed stage; `None` once a new recording starts.
    pub fn subscribe_failures(&self) -> watch::Receiver<Option<CycleFailure>> {
        self.failures.subscribe()
    }

    /// Handle one admitted trigger.
    ///
    /// From `Idle` this starts a recording and returns immediately. From
    /// `Recording` it stops the capture and runs the rest of the cycle to
    /// completion. In `Processing` the trigger is ignored.
    pub async fn handle_trigger(&self) -> CycleOutcome {
        let gate = self.gate.lock().await;

        if !self.state.is_enabled() {
            debug!("Hotkey is disabled, ignoring trigger");
            return CycleOutcome::Disabled;
        }

        match self.state.get_state() {
            SessionState::Processing => {
                debug!("Already processing, ignoring trigger");
                CycleOutcome::Busy
            }
            SessionState::Idle => self.start_recording().await,
            SessionState::Recording => {
                if !self
                    .state
                    .try_transition(SessionState::Recording, SessionState::Processing)
                {
                    return CycleOutcome::Superseded;
                }
                drop(gate);

                let cycle_id = Uuid::new_v4();
                self.process()
                    .instrument(info_span!("cycle", cycle_id = %cycle_id))
                    .await
            }
        }
    }

    /// Enable or disable the hotkey.
    ///
    /// Disabling while recording first returns the state to `Idle`, then
    /// discards the capture and its indicator, then clears the flag. A cycle
    /// that is already processing is left to finish. Enabling registers the
    /// trigger source first and stays disabled if that fails.
    #[instrument(skip(self))]
    pub async fn set_hotkey_enabled(&self, enabled: bool) -> CoreResult<()> {
        let _gate = self.gate.lock().await;
        if enabled {
            self.enable().await
        } else {
            self.disable().await;
            Ok(())
        }
    }

    /// Flip the hotkey-enabled flag and return the new value.
    #[instrument(skip(self))]
    pub async fn toggle_hotkey(&self) -> CoreResult<bool> {
        let _gate = self.gate.lock().await;
        if self.state.is_enabled() {
            self.disable().await;
            Ok(false)
        } else {
            self.enable().await?;
            Ok(true)
        }
    }

    /// Discard an in-flight recording before the process exits.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        let _gate = self.gate.lock().await;
        if self
            .state
            .try_transition(SessionState::Recording, SessionState::Idle)
        {
            info!("Discarding recording on shutdown");
            self.discard_recording().await;
        }
    }

    #[instrument(skip(self))]
    async fn start_recording(&self) -> CycleOutcome {
        if !self
            .state
            .try_transition(SessionState::Idle, SessionState::Recording)
        {
            return CycleOutcome::Superseded;
        }

        if let Err(error) = self.recorder.start().await {
            self.state.set_state(SessionState::Idle);
            return self.report(StageFailure {
                stage: Stage::StartRecording,
                error,
            });
        }

        info!("Recording started, trigger again to stop");
        self.failures.send_if_modified(|last| last.take().is_some());

        if let Err(e) = self.output.show_feedback(Feedback::Recording).await {
            warn!(error = ?e, "Failed to show recording indicator");
        }

        CycleOutcome::RecordingStarted
    }

    async fn process(&self) -> CycleOutcome {
        let result = self.run_cycle().await;

        // Idempotent: the indicator may already be gone.
        if let Err(e) = self.output.clear_feedback().await {
            warn!(error = ?e, "Failed to clear progress indicator");
        }
        self.state.set_state(SessionState::Idle);

        match result {
            Ok(outcome) => outcome,
            Err(failure) => self.report(failure),
        }
    }

    async fn run_cycle(&self) -> Result<CycleOutcome, StageFailure> {
        if let Err(e) = self.output.show_feedback(Feedback::Processing).await {
            warn!(error = ?e, "Failed to show processing indicator");
        }

        let audio = self.recorder.stop().await.map_err(|error| StageFailure {
            stage: Stage::StopRecording,
            error,
        })?;

        let duration = audio.duration();
        let (peak, mean_square) = audio.levels();
        info!(
            sample_count = audio.samples.len(),
            duration_ms = duration.as_millis(),
            peak,
            mean_square,
            "Recording stopped"
        );

        if duration < MIN_RECORDING_DURATION {
            info!(
                duration_ms = duration.as_millis(),
                "Recording too short, ignoring"
            );
            return Ok(CycleOutcome::TooShort { duration });
        }

        let transcript = within(
            "transcription",
            self.stage_timeout,
            self.transcriber.transcribe(audio),
        )
        .await
        .map_err(|error| StageFailure {
            stage: Stage::Transcription,
            error,
        })?;

        let transcript = transcript.trim();
        if transcript.is_empty() {
            info!("No speech detected");
            return Ok(CycleOutcome::NoSpeech);
        }
        info!(text_len = transcript.len(), "Transcription received");

        let parsed = self.parser.parse(transcript);
        if parsed.text.is_empty() {
            info!(command = ?parsed.command, "Only keywords spoken, nothing to deliver");
            return Ok(CycleOutcome::NothingToDeliver);
        }

        // The processing indicator must be gone before anything is typed.
        if let Err(e) = self.output.clear_feedback().await {
            warn!(error = ?e, "Failed to clear processing indicator");
        }

        let delivery = self
            .router
            .route(&parsed)
            .await
            .map_err(|error| StageFailure {
                stage: Stage::Routing,
                error,
            })?;

        info!(command = ?delivery.command, "Cycle complete");
        Ok(CycleOutcome::Delivered(delivery))
    }

    /// Log a failed stage and notify the user when they can fix it.
    /// The state must already be back in `Idle`.
    fn report(&self, failure: StageFailure) -> CycleOutcome {
        let StageFailure { stage, error } = failure;
        let class = error.class();

        error!(stage = %stage, error = ?error, "Cycle failed");

        if class == ErrorClass::UserActionable {
            self.notifier
                .show_error(OUTPUT_FAILURE_TITLE, OUTPUT_FAILURE_MESSAGE);
        }

        self.failures
            .send_replace(Some(CycleFailure { stage, class }));

        CycleOutcome::Failed { stage, class }
    }

    async fn enable(&self) -> CoreResult<()> {
        if self.state.is_enabled() {
            return Ok(());
        }

        self.trigger_source.register().await?;
        self.state.set_enabled(true);

        info!("Hotkey enabled");
        Ok(())
    }

    async fn disable(&self) {
        if !self.state.is_enabled() {
            return;
        }

        if self
            .state
            .try_transition(SessionState::Recording, SessionState::Idle)
        {
            info!("Stopping recording due to hotkey disable");
            self.discard_recording().await;
        }

        self.state.set_enabled(false);

        if let Err(e) = self.trigger_source.unregister().await {
            warn!(error = ?e, "Failed to unregister trigger source");
        }

        info!("Hotkey disabled");
    }

    async fn discard_recording(&self) {
        match self.recorder.stop().await {
            Ok(audio) => debug!(
                sample_count = audio.samples.len(),
                "Discarded captured audio"
            ),
            Err(e) => warn!(error = ?e, "Failed to stop recorder"),
        }

        if let Err(e) = self.output.clear_feedback().await {
            warn!(error = ?e, "Failed to clear recording indicator");
        }
    }
}
