use crate::{MenuAction, MenuIds, StatusNotice, TrayIconState, TrayView, UiCommand, UiProxy};

use voxrelay_core::{SessionController, SessionState, TriggerDispatcher, TriggerOrigin};

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, watch},
    time::MissedTickBehavior,
};
use tracing::{debug, error, info, instrument, warn};
use tray_icon::menu::MenuEvent;

/// Period of each frame of the blinking recording icon.
pub(crate) const BLINK_INTERVAL: Duration = Duration::from_millis(750);

/// Async side of the application.
///
/// Runs on the runtime thread. Turns tray menu clicks into triggers and
/// hotkey toggles, and mirrors session state and failures to the tray through
/// `proxy` because `TrayIcon` is `!Send` and must remain on the UI thread.
pub struct App {
    controller: Arc<SessionController>,
    dispatcher: TriggerDispatcher,
    proxy: Arc<UiProxy>,
    menu_ids: MenuIds,
    shutdown_tx: watch::Sender<bool>,
    notice: Option<StatusNotice>,
    blink: bool,
}

impl App {
    /// Wire the async side to the controller and the UI thread.
    pub(crate) fn new(
        controller: Arc<SessionController>,
        dispatcher: TriggerDispatcher,
        proxy: Arc<UiProxy>,
        menu_ids: MenuIds,
        shutdown_tx: watch::Sender<bool>,
    ) -> Self {
        Self {
            controller,
            dispatcher,
            proxy,
            menu_ids,
            shutdown_tx,
            notice: None,
            blink: false,
        }
    }

    /// Start with `notice` on the status line.
    pub(crate) fn with_notice(mut self, notice: Option<StatusNotice>) -> Self {
        self.notice = notice;
        self
    }

    /// Run until Quit is chosen, an interrupt arrives or the menu channel closes.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) {
        info!("voxrelay starting");

        // Menu event forwarding via single persistent blocking task.
        //
        // MenuEvent::receiver() returns a crossbeam_channel::Receiver which
        // has a blocking recv(), so one thread serves every click.
        //
        // Shutdown: when menu_event_rx is dropped (main loop breaks),
        // menu_event_tx.blocking_send() fails, breaking the blocking loop.
        let (menu_event_tx, mut menu_event_rx) = mpsc::channel(32);
        let menu_handle = tokio::task::spawn_blocking(move || {
            let receiver = MenuEvent::receiver();
            while let Ok(event) = receiver.recv() {
                if menu_event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        let interrupt = tokio::signal::ctrl_c();
        tokio::pin!(interrupt);
        let mut interrupt_armed = true;

        let mut blink_ticker = tokio::time::interval(BLINK_INTERVAL);
        blink_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut state_rx = self.controller.state().subscribe();
        let mut failures_rx = self.controller.subscribe_failures();
        let mut state = *state_rx.borrow_and_update();
        self.publish(state);

        loop {
            tokio::select! {
                Some(event) = menu_event_rx.recv() => {
                    let Some(action) = self.menu_ids.action(&event.id) else {
                        continue;
                    };
                    if self.handle_menu_action(action).await {
                        break;
                    }
                }

                changed = state_rx.changed() => {
                    if changed.is_err() {
                        info!("Session state closed, shutting down");
                        break;
                    }
                    state = *state_rx.borrow_and_update();
                    self.blink = false;
                    blink_ticker.reset();
                    self.publish(state);
                }

                Ok(()) = failures_rx.changed() => {
                    let failure = *failures_rx.borrow_and_update();
                    if let Some(failure) = failure {
                        self.notice = Some(StatusNotice::CycleFailed(failure));
                    } else if matches!(self.notice, Some(StatusNotice::CycleFailed(_))) {
                        self.notice = None;
                    }
                    self.publish(state);
                }

                _ = blink_ticker.tick(), if state == SessionState::Recording => {
                    self.blink = !self.blink;
                    self.publish(state);
                }

                result = &mut interrupt, if interrupt_armed => match result {
                    Ok(()) => {
                        info!("Interrupt received");
                        self.quit().await;
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "Interrupt handler unavailable");
                        interrupt_armed = false;
                    }
                },

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        drop(menu_event_rx);

        match tokio::time::timeout(Duration::from_secs(1), menu_handle).await {
            Ok(Ok(())) => debug!("Menu event forwarder stopped cleanly"),
            Ok(Err(e)) => error!(error = ?e, "Menu event forwarder task panicked"),
            Err(_) => debug!(
                "Menu event forwarder did not stop within timeout, \
                     will be cleaned up on exit"
            ),
        }

        info!("voxrelay shut down successfully");
    }

    /// Handle one menu action. Returns `true` when the app should exit.
    #[instrument(skip(self))]
    async fn handle_menu_action(&mut self, action: MenuAction) -> bool {
        match action {
            MenuAction::ToggleRecording => {
                let admission = self.dispatcher.submit(TriggerOrigin::Menu);
                debug!(admission = ?admission, "Manual trigger submitted");
                false
            }
            MenuAction::ToggleHotkey => {
                match self.controller.toggle_hotkey().await {
                    Ok(enabled) => {
                        info!(enabled, "Hotkey toggled");
                        if self.notice == Some(StatusNotice::HotkeyEnableFailed) {
                            self.notice = None;
                        }
                    }
                    Err(e) => {
                        error!(error = ?e, "Failed to enable hotkey");
                        self.notice = Some(StatusNotice::HotkeyEnableFailed);
                    }
                }
                self.publish(self.controller.state().get_state());
                false
            }
            MenuAction::Quit => {
                info!("Exit requested from tray menu");
                self.quit().await;
                true
            }
        }
    }

    /// Discard any recording, stop the background tasks and close the UI.
    async fn quit(&self) {
        self.controller.shutdown().await;
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.proxy.send(UiCommand::Shutdown) {
            warn!(error = ?e, "UI event loop already closed");
        }
    }

    fn publish(&self, state: SessionState) {
        let hotkey_enabled = self.controller.state().is_enabled();
        let view = TrayView {
            state: TrayIconState::from_session(state, hotkey_enabled),
            hotkey_enabled,
            notice: self.notice,
            blink: self.blink,
        };

        if let Err(e) = self.proxy.send(UiCommand::SetState(view)) {
            warn!(error = ?e, "Failed to send tray update");
        }
    }
}
