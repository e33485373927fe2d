use crate::{
    Command, CommandParser, CycleFailure, CycleOutcome, Delivery, ErrorClass, Feedback,
    OUTPUT_FAILURE_TITLE, SessionSettings, SessionState, Stage,
    tests::fakes::{
        FakeRecorder, FakeRefiner, FakeTranscriber, Harness, OutputEvent, audio_ms,
    },
};

use std::{
    sync::{Arc, atomic::Ordering},
    time::Duration,
};

use tokio::sync::Notify;

/// Start a recording and stop it, returning the second outcome.
async fn record_and_stop(harness: &Harness) -> CycleOutcome {
    assert_eq!(
        harness.controller.handle_trigger().await,
        CycleOutcome::RecordingStarted
    );
    harness.controller.handle_trigger().await
}

/// WHAT: A trigger in Idle starts the microphone and the indicator
/// WHY: The first press of the hotkey begins dictation
#[tokio::test]
async fn given_idle_when_triggered_then_recording_started() {
    // Given
    let harness = Harness::transcribing("hello");

    // When
    let outcome = harness.controller.handle_trigger().await;

    // Then
    assert_eq!(outcome, CycleOutcome::RecordingStarted);
    assert_eq!(harness.controller.state().get_state(), SessionState::Recording);
    assert_eq!(harness.recorder.starts(), 1);
    assert_eq!(
        harness.output.events(),
        vec![OutputEvent::Shown(Feedback::Recording)]
    );
}

/// WHAT: Plain speech is typed exactly once and the session returns to Idle
/// WHY: The basic dictation path must not copy, refine or double-type
#[tokio::test]
async fn given_plain_speech_when_cycle_completes_then_typed_once() {
    // Given
    let harness = Harness::transcribing("  hello world  ");

    // When
    let outcome = record_and_stop(&harness).await;

    // Then: Trimmed text typed after the processing indicator is erased
    assert_eq!(
        outcome,
        CycleOutcome::Delivered(Delivery {
            command: Command::None,
            text: "hello world".to_string(),
        })
    );
    assert_eq!(harness.controller.state().get_state(), SessionState::Idle);
    assert_eq!(
        harness.output.events(),
        vec![
            OutputEvent::Shown(Feedback::Recording),
            OutputEvent::Shown(Feedback::Processing),
            OutputEvent::Cleared,
            OutputEvent::Typed("hello world".to_string()),
            OutputEvent::Cleared,
        ]
    );
    assert!(harness.refiner.inputs().is_empty());
    assert_eq!(harness.transcriber.call_count(), 1);
}

/// WHAT: "Claude clipboard" refines the remainder and copies the result
/// WHY: Combined keywords run refinement then the clipboard, never typing
#[tokio::test]
async fn given_refine_and_clipboard_keywords_when_cycle_completes_then_refined_text_copied() {
    // Given
    let harness = Harness::transcribing("Claude clipboard, fix this");

    // When
    let outcome = record_and_stop(&harness).await;

    // Then
    let refined = FakeRefiner::refined("fix this");
    assert_eq!(
        outcome,
        CycleOutcome::Delivered(Delivery {
            command: Command::RefineAndClipboard,
            text: refined.clone(),
        })
    );
    assert_eq!(harness.refiner.inputs(), vec!["fix this"]);
    assert_eq!(harness.output.copied(), vec![refined]);
    assert!(harness.output.typed().is_empty());
    assert_eq!(harness.notifier.count(), 0);
}

/// WHAT: Recordings under the minimum are discarded before transcription
/// WHY: Accidental double-taps must not reach the recognizer
#[tokio::test]
async fn given_short_recording_when_stopped_then_too_short_and_not_transcribed() {
    // Given: 200ms of audio
    let harness = Harness::build(
        FakeRecorder::with_audio(audio_ms(200)),
        FakeTranscriber::replying("ignored"),
        FakeRefiner::default(),
    );

    // When
    let outcome = record_and_stop(&harness).await;

    // Then
    assert!(matches!(
        outcome,
        CycleOutcome::TooShort { duration } if duration < Duration::from_millis(500)
    ));
    assert_eq!(harness.transcriber.call_count(), 0);
    assert_eq!(harness.controller.state().get_state(), SessionState::Idle);
    assert!(harness.output.typed().is_empty());
}

/// WHAT: A recording of exactly the minimum length is transcribed
/// WHY: The boundary is inclusive
#[tokio::test]
async fn given_recording_at_minimum_when_stopped_then_transcribed() {
    let harness = Harness::build(
        FakeRecorder::with_audio(audio_ms(500)),
        FakeTranscriber::replying("ok"),
        FakeRefiner::default(),
    );

    let outcome = record_and_stop(&harness).await;

    assert!(matches!(outcome, CycleOutcome::Delivered(_)));
    assert_eq!(harness.transcriber.call_count(), 1);
}

/// WHAT: A whitespace-only transcript ends the cycle quietly
/// WHY: Silence is not an error and nothing should be typed
#[tokio::test]
async fn given_blank_transcript_when_cycle_completes_then_no_speech() {
    let harness = Harness::transcribing("   ");

    let outcome = record_and_stop(&harness).await;

    assert_eq!(outcome, CycleOutcome::NoSpeech);
    assert!(harness.output.typed().is_empty());
    assert!(harness.output.copied().is_empty());
    assert_eq!(harness.controller.state().get_state(), SessionState::Idle);
}

/// WHAT: An utterance of only keywords delivers nothing
/// WHY: An empty string must not be sent to the refiner or the clipboard
#[tokio::test]
async fn given_keyword_only_transcript_when_cycle_completes_then_nothing_delivered() {
    let harness = Harness::transcribing("Clipboard.");

    let outcome = record_and_stop(&harness).await;

    assert_eq!(outcome, CycleOutcome::NothingToDeliver);
    assert!(harness.output.copied().is_empty());
    assert!(harness.refiner.inputs().is_empty());
}

/// WHAT: Transcription failure is logged only and the session recovers
/// WHY: Recognition errors are recoverable and must not notify
#[tokio::test]
async fn given_transcription_fails_when_cycle_runs_then_recoverable_failure() {
    // Given
    let harness = Harness::build(
        FakeRecorder::with_audio(audio_ms(1_000)),
        FakeTranscriber::failing(),
        FakeRefiner::default(),
    );

    // When
    let outcome = record_and_stop(&harness).await;

    // Then
    assert_eq!(
        outcome,
        CycleOutcome::Failed {
            stage: Stage::Transcription,
            class: ErrorClass::Recoverable,
        }
    );
    assert_eq!(harness.notifier.count(), 0);
    assert_eq!(harness.controller.state().get_state(), SessionState::Idle);
    assert_eq!(harness.output.events().last(), Some(&OutputEvent::Cleared));
}

/// WHAT: The last failed stage is published until the next recording starts
/// WHY: The tray shows the failure instead of silently returning to idle
#[tokio::test]
async fn given_transcription_fails_when_next_recording_starts_then_failure_cleared() {
    // Given
    let harness = Harness::build(
        FakeRecorder::with_audio(audio_ms(1_000)),
        FakeTranscriber::failing(),
        FakeRefiner::default(),
    );
    let failures = harness.controller.subscribe_failures();
    assert_eq!(*failures.borrow(), None);

    // When
    record_and_stop(&harness).await;

    // Then
    assert_eq!(
        *failures.borrow(),
        Some(CycleFailure {
            stage: Stage::Transcription,
            class: ErrorClass::Recoverable,
        })
    );

    // When
    let outcome = harness.controller.handle_trigger().await;

    // Then
    assert_eq!(outcome, CycleOutcome::RecordingStarted);
    assert_eq!(*failures.borrow(), None);
}

/// WHAT: Output failure raises the permission notification
/// WHY: The user can only fix a missing automation permission if told
#[tokio::test]
async fn given_typing_fails_when_cycle_runs_then_user_notified() {
    // Given
    let harness = Harness::transcribing("hello");
    harness.output.fail_type.store(true, Ordering::SeqCst);

    // When
    let outcome = record_and_stop(&harness).await;

    // Then
    assert_eq!(
        outcome,
        CycleOutcome::Failed {
            stage: Stage::Routing,
            class: ErrorClass::UserActionable,
        }
    );
    let shown = harness.notifier.shown.lock().unwrap_or_else(|e| e.into_inner());
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].0, OUTPUT_FAILURE_TITLE);
    assert_eq!(harness.controller.state().get_state(), SessionState::Idle);
}

/// WHAT: Refinement failure delivers nothing and does not notify
/// WHY: Unrefined text is never substituted for refined text
#[tokio::test]
async fn given_refiner_fails_when_cycle_runs_then_nothing_typed() {
    let harness = Harness::build(
        FakeRecorder::with_audio(audio_ms(1_000)),
        FakeTranscriber::replying("Claude fix this"),
        FakeRefiner::failing(),
    );

    let outcome = record_and_stop(&harness).await;

    assert_eq!(
        outcome,
        CycleOutcome::Failed {
            stage: Stage::Routing,
            class: ErrorClass::Recoverable,
        }
    );
    assert!(harness.output.typed().is_empty());
    assert_eq!(harness.notifier.count(), 0);
    assert_eq!(harness.controller.state().get_state(), SessionState::Idle);
}

/// WHAT: A microphone that fails to start leaves the session Idle
/// WHY: A stuck Recording state would swallow the next trigger
#[tokio::test]
async fn given_recorder_start_fails_when_triggered_then_idle() {
    let harness = Harness::transcribing("hello");
    harness.recorder.fail_start.store(true, Ordering::SeqCst);

    let outcome = harness.controller.handle_trigger().await;

    assert_eq!(
        outcome,
        CycleOutcome::Failed {
            stage: Stage::StartRecording,
            class: ErrorClass::Recoverable,
        }
    );
    assert_eq!(harness.controller.state().get_state(), SessionState::Idle);
    assert!(harness.output.events().is_empty());
}

/// WHAT: A microphone that fails to stop still returns to Idle
/// WHY: Every path out of Processing ends in Idle
#[tokio::test]
async fn given_recorder_stop_fails_when_triggered_then_idle() {
    let harness = Harness::transcribing("hello");
    harness.recorder.fail_stop.store(true, Ordering::SeqCst);

    let outcome = record_and_stop(&harness).await;

    assert_eq!(
        outcome,
        CycleOutcome::Failed {
            stage: Stage::StopRecording,
            class: ErrorClass::Recoverable,
        }
    );
    assert_eq!(harness.transcriber.call_count(), 0);
    assert_eq!(harness.controller.state().get_state(), SessionState::Idle);
}

/// WHAT: A hung transcriber is cut off by the stage timeout
/// WHY: The session must not stay in Processing forever
#[tokio::test]
async fn given_stalled_transcriber_when_timeout_elapses_then_idle() {
    // Given: A transcriber that is never released and a 50ms limit
    let harness = Harness::build_with(
        FakeRecorder::with_audio(audio_ms(1_000)),
        FakeTranscriber::held("never", Arc::new(Notify::new()), Arc::new(Notify::new())),
        FakeRefiner::default(),
        SessionSettings {
            parser: CommandParser::default(),
            stage_timeout: Some(Duration::from_millis(50)),
        },
    );

    // When
    let outcome = record_and_stop(&harness).await;

    // Then
    assert_eq!(
        outcome,
        CycleOutcome::Failed {
            stage: Stage::Transcription,
            class: ErrorClass::Recoverable,
        }
    );
    assert_eq!(harness.controller.state().get_state(), SessionState::Idle);
}

/// WHAT: Triggers are ignored while disabled
/// WHY: A disabled hotkey must have no effect at all
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_disabled_when_triggered_then_nothing_happens() {
    let harness = Harness::transcribing("hello");
    harness.controller.set_hotkey_enabled(false).await.unwrap();

    let outcome = harness.controller.handle_trigger().await;

    assert_eq!(outcome, CycleOutcome::Disabled);
    assert_eq!(harness.recorder.starts(), 0);
    assert_eq!(harness.controller.state().get_state(), SessionState::Idle);
}

/// WHAT: Disabling mid-recording discards the audio without transcribing
/// WHY: Disable is a cancel; no text may appear afterwards
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recording_when_disabled_then_audio_discarded_and_idle() {
    // Given: A recording in progress
    let harness = Harness::transcribing("hello");
    harness.controller.handle_trigger().await;

    // When
    harness.controller.set_hotkey_enabled(false).await.unwrap();

    // Then: Recorder stopped, indicator cleared, nothing transcribed
    assert_eq!(harness.controller.state().get_state(), SessionState::Idle);
    assert!(!harness.controller.state().is_enabled());
    assert_eq!(harness.recorder.stops(), 1);
    assert_eq!(harness.transcriber.call_count(), 0);
    assert_eq!(harness.output.events().last(), Some(&OutputEvent::Cleared));
    assert_eq!(harness.trigger_source.unregisters.load(Ordering::SeqCst), 1);

    // And: A further trigger is ignored
    assert_eq!(
        harness.controller.handle_trigger().await,
        CycleOutcome::Disabled
    );
}

/// WHAT: A failed registration keeps the hotkey disabled
/// WHY: The enabled flag must not claim a hotkey the OS refused
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_registration_fails_when_enabling_then_stays_disabled() {
    // Given
    let harness = Harness::transcribing("hello");
    harness.controller.set_hotkey_enabled(false).await.unwrap();
    harness
        .trigger_source
        .fail_register
        .store(true, Ordering::SeqCst);

    // When
    let result = harness.controller.set_hotkey_enabled(true).await;

    // Then
    assert!(result.is_err());
    assert!(!harness.controller.state().is_enabled());
}

/// WHAT: Toggling flips the flag and re-registers on enable
/// WHY: The tray menu item uses a single toggle action
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_enabled_when_toggled_twice_then_enabled_again() {
    let harness = Harness::transcribing("hello");

    assert!(!harness.controller.toggle_hotkey().await.unwrap());
    assert!(harness.controller.toggle_hotkey().await.unwrap());

    assert!(harness.controller.state().is_enabled());
    assert_eq!(harness.trigger_source.unregisters.load(Ordering::SeqCst), 1);
    assert_eq!(harness.trigger_source.registers.load(Ordering::SeqCst), 1);
}

/// WHAT: Enabling an enabled hotkey does not register twice
/// WHY: Double registration fails on every platform
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_enabled_when_enabling_again_then_no_registration() {
    let harness = Harness::transcribing("hello");

    harness.controller.set_hotkey_enabled(true).await.unwrap();

    assert_eq!(harness.trigger_source.registers.load(Ordering::SeqCst), 0);
}

/// WHAT: A trigger during processing is ignored
/// WHY: Processing triggers are dropped, not queued behind the cycle
#[tokio::test]
async fn given_processing_when_triggered_then_busy() {
    // Given: A cycle parked inside transcription
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let harness = Harness::build(
        FakeRecorder::with_audio(audio_ms(1_000)),
        FakeTranscriber::held("hello", Arc::clone(&entered), Arc::clone(&release)),
        FakeRefiner::default(),
    );
    harness.controller.handle_trigger().await;
    let controller = Arc::clone(&harness.controller);
    let cycle = tokio::spawn(async move { controller.handle_trigger().await });
    entered.notified().await;

    // When
    let outcome = harness.controller.handle_trigger().await;

    // Then: Ignored; the parked cycle still delivers once released
    assert_eq!(outcome, CycleOutcome::Busy);
    assert_eq!(
        harness.controller.state().get_state(),
        SessionState::Processing
    );
    release.notify_one();
    assert!(matches!(
        cycle.await,
        Ok(CycleOutcome::Delivered(Delivery { .. }))
    ));
    assert_eq!(harness.output.typed(), vec!["hello"]);
    assert_eq!(harness.recorder.starts(), 1);
}

/// WHAT: Disabling during processing lets the cycle finish
/// WHY: Only a recording in progress is cancelled by disable
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_processing_when_disabled_then_cycle_completes() {
    // Given: A cycle parked inside transcription
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let harness = Harness::build(
        FakeRecorder::with_audio(audio_ms(1_000)),
        FakeTranscriber::held("hello", Arc::clone(&entered), Arc::clone(&release)),
        FakeRefiner::default(),
    );
    harness.controller.handle_trigger().await;
    let controller = Arc::clone(&harness.controller);
    let cycle = tokio::spawn(async move { controller.handle_trigger().await });
    entered.notified().await;

    // When
    harness.controller.set_hotkey_enabled(false).await.unwrap();

    // Then: Still processing, and the text lands once released
    assert_eq!(
        harness.controller.state().get_state(),
        SessionState::Processing
    );
    release.notify_one();
    assert!(matches!(cycle.await, Ok(CycleOutcome::Delivered(_))));
    assert_eq!(harness.controller.state().get_state(), SessionState::Idle);
    assert!(!harness.controller.state().is_enabled());
    assert_eq!(harness.output.typed(), vec!["hello"]);
}

/// WHAT: Shutdown during a recording discards it
/// WHY: The microphone must not stay open while the process exits
#[tokio::test]
async fn given_recording_when_shutting_down_then_recorder_stopped() {
    let harness = Harness::transcribing("hello");
    harness.controller.handle_trigger().await;

    harness.controller.shutdown().await;

    assert_eq!(harness.recorder.stops(), 1);
    assert_eq!(harness.controller.state().get_state(), SessionState::Idle);
    assert_eq!(harness.transcriber.call_count(), 0);
}

/// WHAT: Consecutive cycles each deliver their own transcript
/// WHY: State must be fully reset between cycles
#[tokio::test]
async fn given_completed_cycle_when_triggered_again_then_new_recording() {
    let harness = Harness::transcribing("again");

    record_and_stop(&harness).await;
    record_and_stop(&harness).await;

    assert_eq!(harness.recorder.starts(), 2);
    assert_eq!(harness.output.typed(), vec!["again", "again"]);
}

/// WHAT: Many concurrent toggles and triggers all complete
/// WHY: Enable/disable races with the hotkey must never deadlock the gate
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn given_concurrent_toggles_and_triggers_when_racing_then_all_finish() {
    // Given
    let harness = Harness::transcribing("hello");
    let mut tasks = Vec::new();

    // When: 32 toggles interleaved with 32 triggers
    for _ in 0..32 {
        let controller = Arc::clone(&harness.controller);
        tasks.push(tokio::spawn(async move {
            let _ = controller.toggle_hotkey().await;
        }));
        let controller = Arc::clone(&harness.controller);
        tasks.push(tokio::spawn(async move {
            let _ = controller.handle_trigger().await;
        }));
    }
    let finished = tokio::time::timeout(Duration::from_secs(5), async {
        for task in tasks {
            let _ = task.await;
        }
    })
    .await;

    // Then: Nothing hung, and the state is a settled value
    assert!(finished.is_ok());
    assert_ne!(
        harness.controller.state().get_state(),
        SessionState::Processing
    );
    // An even number of toggles lands back on enabled.
    assert!(harness.controller.state().is_enabled());
}
