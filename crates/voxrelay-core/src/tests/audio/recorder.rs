use crate::{MicrophoneRecorder, Recorder};

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

/// WHAT: Stopping the microphone lets other tasks on the same thread run
/// WHY: Closing the stream and resampling must not stall the hotkey listener
#[tokio::test(flavor = "current_thread")]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
#[allow(clippy::unwrap_used)]
async fn given_recording_when_stopping_then_other_tasks_keep_running() {
    // Given: A task that counts every time it gets scheduled
    let ticks = Arc::new(AtomicUsize::new(0));
    let ticker = tokio::spawn({
        let ticks = Arc::clone(&ticks);
        async move {
            loop {
                ticks.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
            }
        }
    });

    let recorder = MicrophoneRecorder::new().unwrap();
    recorder.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    // When: Stopping without any other await in between
    ticks.store(0, Ordering::SeqCst);
    let audio = recorder.stop().await;

    // Then: The ticker ran while stop was in flight
    assert!(ticks.load(Ordering::SeqCst) > 0);
    assert!(audio.is_ok());
    assert!(!recorder.is_active());
    ticker.abort();
}
