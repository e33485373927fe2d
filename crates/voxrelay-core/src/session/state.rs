use std::{
    fmt,
    sync::{Mutex, MutexGuard},
};

use tokio::sync::watch;
use tracing::{debug, info};

/// Lifecycle of the single dictation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Waiting for a trigger.
    Idle,
    /// Microphone is capturing; the next trigger stops it.
    Recording,
    /// Captured audio is being transcribed and routed.
    Processing,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::Recording => write!(f, "Recording"),
            SessionState::Processing => write!(f, "Processing"),
        }
    }
}

/// Session state plus the hotkey-enabled flag, each behind its own lock.
///
/// Forward progress only happens through [`try_transition`], so two callers
/// racing on the same expected state cannot both win. Any `(expected, new)`
/// pair is accepted; the only check is that the current state matches.
///
/// [`try_transition`]: SessionStateMachine::try_transition
pub struct SessionStateMachine {
    state: Mutex<SessionState>,
    enabled: Mutex<bool>,
    changes: watch::Sender<SessionState>,
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStateMachine {
    /// Create a machine in `Idle` with the hotkey enabled.
    pub fn new() -> Self {
        let (changes, _) = watch::channel(SessionState::Idle);
        Self {
            state: Mutex::new(SessionState::Idle),
            enabled: Mutex::new(true),
            changes,
        }
    }

    /// Current state.
    pub fn get_state(&self) -> SessionState {
        *self.lock_state()
    }

    /// Unconditionally set the state. Used for resets back to `Idle`.
    pub fn set_state(&self, new: SessionState) {
        let mut state = self.lock_state();
        let old = *state;
        *state = new;
        self.changes.send_replace(new);
        info!(from = %old, to = %new, "State transition");
    }

    /// Set the state to `new` only if it currently equals `expected`.
    ///
    /// Returns `false` without touching the state when another caller has
    /// already moved it.
    pub fn try_transition(&self, expected: SessionState, new: SessionState) -> bool {
        let mut state = self.lock_state();
        if *state != expected {
            debug!(
                expected = %expected,
                actual = %*state,
                requested = %new,
                "State transition rejected"
            );
            return false;
        }
        *state = new;
        self.changes.send_replace(new);
        info!(from = %expected, to = %new, "State transition");
        true
    }

    /// Whether triggers are currently accepted.
    pub fn is_enabled(&self) -> bool {
        *self.lock_enabled()
    }

    /// Set the hotkey-enabled flag.
    pub fn set_enabled(&self, enabled: bool) {
        let mut flag = self.lock_enabled();
        if *flag != enabled {
            debug!(enabled, "Hotkey enabled flag changed");
        }
        *flag = enabled;
    }

    /// Receive every state change, starting from the current state.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.changes.subscribe()
    }

    // A poisoned lock still holds a valid enum; no write can be half-done.
    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_enabled(&self) -> MutexGuard<'_, bool> {
        self.enabled.lock().unwrap_or_else(|e| e.into_inner())
    }
}
