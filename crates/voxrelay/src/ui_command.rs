use crate::{AppError, AppResult, TrayView};

use std::{panic::Location, sync::Mutex};

use error_location::ErrorLocation;
use tao::event_loop::EventLoopProxy;
use tokio::sync::oneshot;

/// Requests sent from the async runtime to the main UI thread.
///
/// The main thread owns `TrayManager` (because `TrayIcon` is `!Send`) and the
/// `GlobalHotKeyManager` (registration needs the thread's message pump), so
/// every tray mutation, hotkey (un)registration and the exit request flow
/// through this enum.
#[derive(Debug)]
pub enum UiCommand {
    /// Update the tray icon, tooltip and menu labels.
    SetState(TrayView),
    /// Register the global hotkey and report the result.
    RegisterHotkey {
        /// Receives the registration result.
        reply: oneshot::Sender<AppResult<()>>,
    },
    /// Unregister the global hotkey and report the result.
    UnregisterHotkey {
        /// Receives the unregistration result.
        reply: oneshot::Sender<AppResult<()>>,
    },
    /// Leave the event loop; the process exits.
    Shutdown,
}

/// Shareable handle for sending [`UiCommand`]s to the event loop.
///
/// `EventLoopProxy` is `Send` but not `Sync` on every platform, so it sits
/// behind a mutex to let tasks on any runtime thread hold it by reference.
pub struct UiProxy {
    proxy: Mutex<EventLoopProxy<UiCommand>>,
}

impl UiProxy {
    /// Wrap the proxy of the running event loop.
    pub fn new(proxy: EventLoopProxy<UiCommand>) -> Self {
        Self {
            proxy: Mutex::new(proxy),
        }
    }

    /// Queue `command` for the UI thread.
    #[track_caller]
    pub fn send(&self, command: UiCommand) -> AppResult<()> {
        self.proxy
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .send_event(command)
            .map_err(|_| AppError::ChannelSendFailed {
                message: "UI event loop has closed".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
