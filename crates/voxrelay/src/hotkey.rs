//! Global hotkey: registration on the UI thread and event forwarding.
//!
//! `GlobalHotKeyManager` must live on the thread running the `tao` event loop
//! (Windows delivers `WM_HOTKEY` through that thread's message pump), so
//! [`HotkeyRegistry`] stays there. The async side reaches it through
//! [`HotkeyTrigger`], which sends requests over the event loop proxy and waits
//! for the reply. [`HotkeyListener`] turns key presses into dispatcher
//! submissions.

use crate::{AppError, AppResult, UiCommand, UiProxy};

use voxrelay_core::{
    Admission, CoreError, CoreResult, TriggerDispatcher, TriggerOrigin, TriggerSource,
};

use std::{panic::Location, str::FromStr, sync::Arc, time::Duration};

use async_trait::async_trait;
use error_location::ErrorLocation;
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState, hotkey::HotKey};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, instrument, warn};

/// Parse a binding such as `control+shift+Space`.
#[track_caller]
pub fn parse_binding(binding: &str) -> AppResult<HotKey> {
    HotKey::from_str(binding).map_err(|e| AppError::HotkeyRegistrationFailed {
        reason: format!("Invalid hotkey binding '{}': {}", binding, e),
        location: ErrorLocation::from(Location::caller()),
    })
}

/// Owner of the OS hotkey registration. Lives on the UI thread.
pub struct HotkeyRegistry {
    manager: GlobalHotKeyManager,
    hotkey: HotKey,
    binding: String,
    registered: bool,
}

impl HotkeyRegistry {
    /// Create the manager for `binding` without registering it.
    #[track_caller]
    #[instrument]
    pub fn new(binding: &str) -> AppResult<Self> {
        let hotkey = parse_binding(binding)?;

        let manager =
            GlobalHotKeyManager::new().map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to create manager: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(Self {
            manager,
            hotkey,
            binding: binding.to_string(),
            registered: false,
        })
    }

    /// ID carried by events for this hotkey.
    pub fn id(&self) -> u32 {
        self.hotkey.id()
    }

    /// Register with the OS. A no-op if already registered.
    #[track_caller]
    #[instrument(skip(self), fields(hotkey = %self.binding))]
    pub fn register(&mut self) -> AppResult<()> {
        if self.registered {
            return Ok(());
        }

        self.manager
            .register(self.hotkey)
            .map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to register {}: {}", self.binding, e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.registered = true;
        info!("Global hotkey registered");
        Ok(())
    }

    /// Unregister from the OS. A no-op if not registered.
    #[track_caller]
    #[instrument(skip(self), fields(hotkey = %self.binding))]
    pub fn unregister(&mut self) -> AppResult<()> {
        if !self.registered {
            return Ok(());
        }

        self.manager
            .unregister(self.hotkey)
            .map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to unregister {}: {}", self.binding, e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.registered = false;
        info!("Global hotkey unregistered");
        Ok(())
    }
}

/// [`TriggerSource`] that forwards (un)registration to the UI thread.
pub struct HotkeyTrigger {
    proxy: Arc<UiProxy>,
}

impl HotkeyTrigger {
    /// Create a trigger source that talks to the event loop behind `proxy`.
    pub fn new(proxy: Arc<UiProxy>) -> Self {
        Self { proxy }
    }

    async fn request(
        &self,
        make: impl FnOnce(oneshot::Sender<AppResult<()>>) -> UiCommand,
    ) -> CoreResult<()> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.proxy
            .send(make(reply_tx))
            .map_err(|e| CoreError::trigger_source(e.to_string()))?;

        reply_rx
            .await
            .map_err(|_| CoreError::trigger_source("UI thread dropped the request"))?
            .map_err(|e| CoreError::trigger_source(e.to_string()))
    }
}

#[async_trait]
impl TriggerSource for HotkeyTrigger {
    async fn register(&self) -> CoreResult<()> {
        self.request(|reply| UiCommand::RegisterHotkey { reply }).await
    }

    async fn unregister(&self) -> CoreResult<()> {
        self.request(|reply| UiCommand::UnregisterHotkey { reply }).await
    }
}

/// Forwards presses of one hotkey to the dispatcher.
pub struct HotkeyListener {
    hotkey_id: u32,
    dispatcher: TriggerDispatcher,
}

impl HotkeyListener {
    /// Create a listener for the hotkey with `hotkey_id`.
    pub fn new(hotkey_id: u32, dispatcher: TriggerDispatcher) -> Self {
        Self {
            hotkey_id,
            dispatcher,
        }
    }

    /// Forward hotkey presses until shutdown is signalled.
    #[instrument(skip_all)]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) {
        let receiver = GlobalHotKeyEvent::receiver().clone();
        let (event_tx, mut event_rx) = mpsc::channel(32);

        // Single persistent blocking task that forwards hotkey events.
        // GlobalHotKeyEvent::receiver() returns a crossbeam_channel::Receiver
        // whose recv() blocks; when event_rx is dropped the next
        // blocking_send() fails and the task ends.
        let handle = tokio::task::spawn_blocking(move || {
            while let Ok(event) = receiver.recv() {
                if event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Hotkey listener shutting down");
                    break;
                }
                Some(event) = event_rx.recv() => {
                    self.handle_event(event);
                }
            }
        }

        drop(event_rx);

        // The blocking task may be parked in recv() until the next hotkey
        // event; the runtime cleans it up on exit.
        match tokio::time::timeout(Duration::from_secs(1), handle).await {
            Ok(Ok(())) => debug!("Hotkey event forwarder stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Hotkey event forwarder task panicked"),
            Err(_) => debug!(
                "Hotkey event forwarder did not stop within timeout, \
                   will be cleaned up on exit"
            ),
        }
    }

    /// Submit a trigger for presses of our hotkey. Releases and other
    /// hotkeys are ignored.
    pub(crate) fn handle_event(&self, event: GlobalHotKeyEvent) -> Option<Admission> {
        if event.id != self.hotkey_id || event.state != HotKeyState::Pressed {
            return None;
        }

        let admission = self.dispatcher.submit(TriggerOrigin::Hotkey);
        debug!(admission = ?admission, "Hotkey pressed");
        Some(admission)
    }
}
