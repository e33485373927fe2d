//! System tray icon with state-based updates.
//!
//! Manages a system tray icon with four states (Idle, Recording, Processing,
//! Disabled) and a context menu for manual recording, the hotkey toggle, a
//! status line and Quit. The recording icon blinks between a solid and a dim
//! frame.

use crate::{AppError, AppResult, TrayIconState, TrayView};

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::{info, instrument};
use tray_icon::{
    Icon, TrayIcon, TrayIconBuilder,
    menu::{Menu, MenuId, MenuItem, PredefinedMenuItem},
};

/// Edge length of the generated icons in pixels.
pub(crate) const ICON_SIZE: u32 = 32;

/// Width of the ring drawn for the disabled icon.
const RING_WIDTH: f32 = 3.0;

/// Opacity of the dim frame of the blinking recording icon.
pub(crate) const DIM_ALPHA: u8 = 0x60;

/// What a tray menu click asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Start or stop a recording, as the hotkey would.
    ToggleRecording,
    /// Enable or disable the global hotkey.
    ToggleHotkey,
    /// Exit the application.
    Quit,
}

/// Identifiers of the clickable menu items. `Send`, unlike the items.
#[derive(Debug, Clone)]
pub struct MenuIds {
    /// Start/Stop Recording.
    pub toggle_recording: MenuId,
    /// Disable/Enable Hotkey.
    pub toggle_hotkey: MenuId,
    /// Quit.
    pub quit: MenuId,
}

impl MenuIds {
    /// Map a clicked item to its action. `None` for the status line.
    pub fn action(&self, id: &MenuId) -> Option<MenuAction> {
        if *id == self.toggle_recording {
            Some(MenuAction::ToggleRecording)
        } else if *id == self.toggle_hotkey {
            Some(MenuAction::ToggleHotkey)
        } else if *id == self.quit {
            Some(MenuAction::Quit)
        } else {
            None
        }
    }
}

/// System tray icon manager.
pub struct TrayManager {
    tray_icon: TrayIcon,
    recording_item: MenuItem,
    hotkey_item: MenuItem,
    status_item: MenuItem,
    ids: MenuIds,
}

impl TrayManager {
    /// Create a new tray manager in the Idle state.
    #[track_caller]
    #[instrument]
    pub fn new() -> AppResult<Self> {
        let menu = Menu::new();

        let initial = TrayIconState::Idle;
        let recording_item = MenuItem::new(initial.recording_label(), true, None);
        let hotkey_item = MenuItem::new(TrayIconState::hotkey_toggle_label(true), true, None);
        let status_item = MenuItem::new(initial.status_label(), false, None);
        let quit_item = MenuItem::new("Quit", true, None);

        let ids = MenuIds {
            toggle_recording: recording_item.id().clone(),
            toggle_hotkey: hotkey_item.id().clone(),
            quit: quit_item.id().clone(),
        };

        menu.append_items(&[
            &recording_item,
            &PredefinedMenuItem::separator(),
            &hotkey_item,
            &PredefinedMenuItem::separator(),
            &status_item,
            &PredefinedMenuItem::separator(),
            &quit_item,
        ])
        .map_err(|e| AppError::TrayError {
            reason: format!("Failed to build tray menu: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let tray_icon = TrayIconBuilder::new()
            .with_tooltip(initial.tooltip())
            .with_menu(Box::new(menu))
            .with_icon(Self::load_icon(initial, false)?)
            .build()
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to create tray icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("System tray icon initialized");

        Ok(Self {
            tray_icon,
            recording_item,
            hotkey_item,
            status_item,
            ids,
        })
    }

    /// Update icon, tooltip and menu labels.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn update_state(&mut self, view: TrayView) -> AppResult<()> {
        let state = view.state;

        self.tray_icon
            .set_icon(Some(Self::load_icon(state, view.dimmed())?))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.tray_icon
            .set_tooltip(Some(state.tooltip()))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update tooltip: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.recording_item.set_text(state.recording_label());
        self.recording_item.set_enabled(state.recording_enabled());
        self.hotkey_item
            .set_text(TrayIconState::hotkey_toggle_label(view.hotkey_enabled));
        self.status_item.set_text(view.status_label());

        Ok(())
    }

    /// Identifiers of the clickable menu items.
    pub fn menu_ids(&self) -> &MenuIds {
        &self.ids
    }

    #[track_caller]
    fn load_icon(state: TrayIconState, dimmed: bool) -> AppResult<Icon> {
        Icon::from_rgba(icon_rgba(state, dimmed), ICON_SIZE, ICON_SIZE).map_err(|e| {
            AppError::TrayError {
                reason: format!("Failed to create icon from RGBA: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }
        })
    }
}

fn icon_color(state: TrayIconState) -> [u8; 3] {
    match state {
        TrayIconState::Idle => [0x4c, 0xaf, 0x50],
        TrayIconState::Recording => [0xe5, 0x39, 0x35],
        TrayIconState::Processing => [0xff, 0xa0, 0x00],
        TrayIconState::Disabled => [0x9e, 0x9e, 0x9e],
    }
}

/// Draw the icon for `state`: a filled disc, or a ring when disabled.
/// `dimmed` draws the translucent frame used to blink while recording.
/// Returns `ICON_SIZE * ICON_SIZE` RGBA pixels, row-major.
pub(crate) fn icon_rgba(state: TrayIconState, dimmed: bool) -> Vec<u8> {
    let [r, g, b] = icon_color(state);
    let hollow = state == TrayIconState::Disabled;
    let opaque = if dimmed { DIM_ALPHA } else { 0xff };

    let center = (ICON_SIZE as f32 - 1.0) / 2.0;
    let outer = ICON_SIZE as f32 / 2.0 - 1.0;
    let inner = outer - RING_WIDTH;

    let mut rgba = Vec::with_capacity((ICON_SIZE * ICON_SIZE * 4) as usize);
    for y in 0..ICON_SIZE {
        for x in 0..ICON_SIZE {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            let dist = (dx * dx + dy * dy).sqrt();
            let covered = dist <= outer && (!hollow || dist >= inner);
            rgba.extend_from_slice(&[r, g, b, if covered { opaque } else { 0 }]);
        }
    }
    rgba
}
