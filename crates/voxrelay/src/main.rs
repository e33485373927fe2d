//! voxrelay: push-to-talk dictation with keyword routing, driven by a global
//! hotkey and a system tray menu.

mod app;
mod config;
mod error;
mod hotkey;
mod logging;
mod notifier;
mod output_handler;
mod paste_key_guard;
mod refiner;
mod tray_icon_state;
mod tray_manager;
mod ui_command;

pub(crate) use {
    app::App,
    error::{AppError, Result as AppResult},
    hotkey::{HotkeyListener, HotkeyRegistry, HotkeyTrigger},
    notifier::DesktopNotifier,
    output_handler::OutputHandler,
    refiner::CliRefiner,
    tray_icon_state::{StatusNotice, TrayIconState, TrayView},
    tray_manager::{MenuAction, MenuIds, TrayManager},
    ui_command::{UiCommand, UiProxy},
};

use crate::config::Config;

use voxrelay_core::{
    Collaborators, MicrophoneRecorder, SessionController, SessionSettings, TriggerDispatcher,
    WhisperTranscriber,
};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tao::{
    event::{Event, StartCause},
    event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy},
};
use tokio::sync::{oneshot, watch};
use tracing::{error, info, warn};

/// Application entry point.
fn main() {
    let log_guard = match Config::log_dir().and_then(|dir| logging::init(&dir)) {
        Ok(guard) => Some(guard),
        Err(e) => {
            logging::init_stderr_only();
            warn!(error = ?e, "File logging unavailable, logging to stderr only");
            None
        }
    };

    let event_loop = EventLoopBuilder::<UiCommand>::with_user_event().build();
    let proxy = event_loop.create_proxy();

    // TrayManager lives on the main thread - TrayIcon is !Send on all platforms.
    let mut tray_manager = match TrayManager::new() {
        Ok(tm) => tm,
        Err(e) => {
            error!("Failed to create TrayManager: {:?}", e);
            std::process::exit(1);
        }
    };

    // Lives on the main thread for the app's lifetime: tao's event loop pumps
    // the Windows messages needed for WM_HOTKEY delivery.
    let mut hotkey_registry: Option<HotkeyRegistry> = None;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        // Keeps the non-blocking log writer alive for the process lifetime.
        let _ = &log_guard;

        match event {
            Event::UserEvent(command) => match command {
                UiCommand::SetState(view) => {
                    if let Err(e) = tray_manager.update_state(view) {
                        error!(error = ?e, "Failed to update tray icon");
                    }
                }
                UiCommand::RegisterHotkey { reply } => {
                    let result = with_registry(&mut hotkey_registry, HotkeyRegistry::register);
                    answer(reply, result);
                }
                UiCommand::UnregisterHotkey { reply } => {
                    let result = with_registry(&mut hotkey_registry, HotkeyRegistry::unregister);
                    answer(reply, result);
                }
                UiCommand::Shutdown => {
                    if let Err(e) = with_registry(&mut hotkey_registry, HotkeyRegistry::unregister)
                    {
                        warn!(error = ?e, "Failed to unregister hotkey on exit");
                    }
                    *control_flow = ControlFlow::ExitWithCode(0);
                }
            },
            Event::NewEvents(StartCause::Init) => {
                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};
                    CFRunLoopWakeUp(CFRunLoopGetMain());
                }

                match start(proxy.clone(), tray_manager.menu_ids().clone()) {
                    Ok(registry) => hotkey_registry = Some(registry),
                    Err(e) => {
                        error!(error = ?e, "Failed to start voxrelay");
                        std::process::exit(1);
                    }
                }
            }
            _ => {}
        }
    });
}

/// Build every collaborator, register the hotkey and spawn the runtime
/// thread. Returns the registry, which must stay on the UI thread.
fn start(proxy: EventLoopProxy<UiCommand>, menu_ids: MenuIds) -> AppResult<HotkeyRegistry> {
    let config = Config::load()?;
    config.validate_model_path()?;

    let mut registry = HotkeyRegistry::new(&config.hotkey.binding)?;
    let proxy = Arc::new(UiProxy::new(proxy));

    let collaborators = Collaborators {
        recorder: Arc::new(MicrophoneRecorder::new()?),
        transcriber: Arc::new(WhisperTranscriber::new(
            &config.whisper.model_path,
            config.whisper.use_gpu,
            &config.whisper.language,
        )?),
        refiner: Arc::new(CliRefiner::new(
            config.refiner.program.clone(),
            config.refiner.system_prompt.clone(),
        )),
        output: Arc::new(OutputHandler::new(config.behaviour.progress_indicators)?),
        trigger_source: Arc::new(HotkeyTrigger::new(Arc::clone(&proxy))),
        notifier: Arc::new(DesktopNotifier),
    };

    let settings = SessionSettings {
        parser: config.command_parser(),
        stage_timeout: config.stage_timeout(),
    };
    let controller = Arc::new(SessionController::new(collaborators, settings));

    // A hotkey that cannot be registered leaves the app usable from the tray;
    // the user can retry through "Enable Hotkey".
    let mut notice = None;
    if let Err(e) = registry.register() {
        error!(error = ?e, "Failed to register hotkey, starting disabled");
        controller.state().set_enabled(false);
        notice = Some(StatusNotice::HotkeyEnableFailed);
    }

    let (dispatcher, worker) = TriggerDispatcher::new(Arc::clone(&controller));
    let listener = HotkeyListener::new(registry.id(), dispatcher.clone());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let app = App::new(controller, dispatcher, proxy, menu_ids, shutdown_tx).with_notice(notice);

    // TrayManager and the hotkey registry stay on the main thread.
    std::thread::Builder::new()
        .name("voxrelay-runtime".to_string())
        .spawn(move || {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    error!("Failed to create tokio runtime: {:?}", e);
                    std::process::exit(1);
                }
            };

            rt.block_on(async {
                // Separate tasks so a slow cycle never stalls the hotkey
                // listener, the menu or the interrupt handler.
                let worker = tokio::spawn(worker.run(shutdown_rx.clone()));
                let listener = tokio::spawn(async move { listener.run(shutdown_rx).await });
                let app = tokio::spawn(app.run());

                let (worker, listener, app) = tokio::join!(worker, listener, app);
                for (task, result) in [("worker", worker), ("listener", listener), ("app", app)] {
                    if let Err(e) = result {
                        error!(task, error = ?e, "Runtime task panicked");
                    }
                }
            });
        })?;

    info!(hotkey = %config.hotkey.binding, "voxrelay ready");
    Ok(registry)
}

#[track_caller]
fn with_registry(
    registry: &mut Option<HotkeyRegistry>,
    op: fn(&mut HotkeyRegistry) -> AppResult<()>,
) -> AppResult<()> {
    match registry.as_mut() {
        Some(registry) => op(registry),
        None => Err(AppError::HotkeyRegistrationFailed {
            reason: "Hotkey manager not initialized".to_string(),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}

fn answer(reply: oneshot::Sender<AppResult<()>>, result: AppResult<()>) {
    if let Err(e) = &result {
        warn!(error = ?e, "Hotkey request failed");
    }
    if reply.send(result).is_err() {
        warn!("Hotkey requester went away before the reply");
    }
}
