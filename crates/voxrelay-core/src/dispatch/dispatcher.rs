//! Trigger admission and the single cycle worker.
//!
//! Producers (the hotkey forwarder, the tray menu) call
//! [`TriggerDispatcher::submit`], which never blocks. Admitted triggers wait
//! in a queue of one slot; a trigger arriving while the slot is taken is
//! dropped, which collapses key-repeat bursts into one action. The
//! [`TriggerWorker`] runs the controller for one trigger at a time.

use crate::{
    dispatch::{Trigger, TriggerOrigin},
    session::{CycleOutcome, SessionController, SessionState},
};

use std::sync::Arc;

use tokio::sync::{
    mpsc::{self, error::TrySendError},
    watch,
};
use tracing::{Instrument, debug, info, info_span, instrument};

/// Slots in the admission queue.
pub const ADMISSION_CAPACITY: usize = 1;

/// What happened to a submitted trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Queued for the worker.
    Queued,
    /// Dropped because a trigger is already waiting.
    Coalesced,
    /// Dropped because the hotkey is disabled.
    Disabled,
    /// Dropped because a cycle is processing.
    Busy,
    /// Dropped because the worker has shut down.
    Closed,
}

/// Cloneable producer side of the dispatcher.
#[derive(Clone)]
pub struct TriggerDispatcher {
    tx: mpsc::Sender<Trigger>,
    controller: Arc<SessionController>,
}

impl TriggerDispatcher {
    /// Create the dispatcher and the worker that consumes its queue.
    pub fn new(controller: Arc<SessionController>) -> (Self, TriggerWorker) {
        let (tx, rx) = mpsc::channel(ADMISSION_CAPACITY);
        let worker = TriggerWorker {
            rx,
            controller: Arc::clone(&controller),
        };
        (Self { tx, controller }, worker)
    }

    /// Offer a trigger to the worker. Never blocks.
    pub fn submit(&self, origin: TriggerOrigin) -> Admission {
        let state = self.controller.state();

        if !state.is_enabled() {
            debug!(origin = %origin, "Hotkey is disabled, ignoring trigger");
            return Admission::Disabled;
        }

        if state.get_state() == SessionState::Processing {
            debug!(origin = %origin, "Already processing, ignoring trigger");
            return Admission::Busy;
        }

        let trigger = Trigger::new(origin);
        match self.tx.try_send(trigger) {
            Ok(()) => {
                debug!(trigger_id = %trigger.id, origin = %origin, "Trigger queued");
                Admission::Queued
            }
            Err(TrySendError::Full(_)) => {
                debug!(origin = %origin, "Trigger already pending, coalescing");
                Admission::Coalesced
            }
            Err(TrySendError::Closed(_)) => {
                debug!(origin = %origin, "Trigger worker stopped, dropping trigger");
                Admission::Closed
            }
        }
    }
}

/// Consumer side: runs the controller for one trigger at a time.
pub struct TriggerWorker {
    rx: mpsc::Receiver<Trigger>,
    controller: Arc<SessionController>,
}

impl TriggerWorker {
    /// Process triggers until shutdown is signalled or every producer is gone.
    ///
    /// A cycle in progress is always finished before the shutdown signal is
    /// observed.
    #[instrument(skip_all)]
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        info!("Trigger worker started");

        loop {
            let trigger = tokio::select! {
                biased;
                _ = shutdown_rx.changed() => {
                    info!("Trigger worker shutting down");
                    break;
                }
                trigger = self.rx.recv() => match trigger {
                    Some(trigger) => trigger,
                    None => {
                        info!("All trigger producers dropped, worker stopping");
                        break;
                    }
                },
            };

            self.dispatch(trigger).await;
        }
    }

    /// Wait for one trigger and handle it. `None` once all producers are gone.
    pub async fn process_next(&mut self) -> Option<CycleOutcome> {
        let trigger = self.rx.recv().await?;
        Some(self.dispatch(trigger).await)
    }

    async fn dispatch(&mut self, trigger: Trigger) -> CycleOutcome {
        let span = info_span!(
            "trigger",
            trigger_id = %trigger.id,
            origin = %trigger.origin
        );

        let outcome = self.controller.handle_trigger().instrument(span).await;

        debug!(
            trigger_id = %trigger.id,
            latency_ms = trigger.received_at.elapsed().as_millis(),
            outcome = ?outcome,
            "Trigger handled"
        );

        if outcome.processed() {
            let dropped = self.drain_stale();
            if dropped > 0 {
                debug!(dropped, "Dropped triggers admitted during processing");
            }
        }

        outcome
    }

    /// Discard triggers admitted while the last cycle was processing.
    fn drain_stale(&mut self) -> usize {
        let mut dropped = 0;
        while self.rx.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }
}
