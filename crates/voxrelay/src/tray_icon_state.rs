use voxrelay_core::{CycleFailure, ErrorClass, SessionState, Stage};

/// Tray icon states corresponding to application workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayIconState {
    /// Ready to start recording.
    Idle,
    /// Currently recording audio.
    Recording,
    /// Transcribing, refining or delivering.
    Processing,
    /// Hotkey disabled; triggers are ignored.
    Disabled,
}

impl TrayIconState {
    /// Icon state for a session state and hotkey flag.
    ///
    /// An active cycle is shown even while disabled, since disabling lets a
    /// processing cycle finish.
    pub fn from_session(state: SessionState, enabled: bool) -> Self {
        match (state, enabled) {
            (SessionState::Recording, _) => TrayIconState::Recording,
            (SessionState::Processing, _) => TrayIconState::Processing,
            (SessionState::Idle, true) => TrayIconState::Idle,
            (SessionState::Idle, false) => TrayIconState::Disabled,
        }
    }

    /// Hover text for the icon.
    pub fn tooltip(self) -> &'static str {
        match self {
            TrayIconState::Idle => "voxrelay - Ready",
            TrayIconState::Recording => "voxrelay - Recording...",
            TrayIconState::Processing => "voxrelay - Transcribing...",
            TrayIconState::Disabled => "voxrelay - Hotkey disabled",
        }
    }

    /// Text of the read-only status line in the menu.
    pub fn status_label(self) -> &'static str {
        match self {
            TrayIconState::Idle => "Status: Ready",
            TrayIconState::Recording => "Status: Recording...",
            TrayIconState::Processing => "Status: Processing...",
            TrayIconState::Disabled => "Status: Hotkey disabled",
        }
    }

    /// Label of the manual start/stop item.
    pub fn recording_label(self) -> &'static str {
        match self {
            TrayIconState::Recording => "Stop Recording",
            _ => "Start Recording",
        }
    }

    /// Whether the manual start/stop item is clickable.
    pub fn recording_enabled(self) -> bool {
        matches!(self, TrayIconState::Idle | TrayIconState::Recording)
    }

    /// Label of the hotkey toggle item.
    pub fn hotkey_toggle_label(enabled: bool) -> &'static str {
        if enabled {
            "Disable Hotkey"
        } else {
            "Enable Hotkey"
        }
    }
}

/// Last failure, shown on the status line until it is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusNotice {
    /// Enabling the hotkey failed, at startup or from the menu.
    HotkeyEnableFailed,
    /// A cycle stage failed.
    CycleFailed(CycleFailure),
}

impl StatusNotice {
    /// Status line text for the failure.
    pub fn label(self) -> &'static str {
        match self {
            StatusNotice::HotkeyEnableFailed => "Error: Failed to enable hotkey",
            StatusNotice::CycleFailed(failure) => match (failure.stage, failure.class) {
                (Stage::StartRecording, _) => "Error: Failed to start recording",
                (Stage::StopRecording, _) => "Error: Failed to stop recording",
                (Stage::Transcription, _) => "Error: Transcription failed",
                (Stage::Routing, ErrorClass::UserActionable) => {
                    "Error: Could not type or copy text"
                }
                (Stage::Routing, ErrorClass::Recoverable) => "Error: Rephrasing failed",
            },
        }
    }
}

/// Everything the tray renders, sent as one update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrayView {
    /// Icon state.
    pub state: TrayIconState,
    /// Whether the hotkey is enabled.
    pub hotkey_enabled: bool,
    /// Unresolved failure, if any.
    pub notice: Option<StatusNotice>,
    /// Dim frame of the blinking recording icon.
    pub blink: bool,
}

impl TrayView {
    /// Status line text. A notice replaces the idle and disabled text but
    /// never hides an active recording or processing cycle.
    pub fn status_label(&self) -> &'static str {
        match (self.state, self.notice) {
            (TrayIconState::Idle | TrayIconState::Disabled, Some(notice)) => notice.label(),
            (state, _) => state.status_label(),
        }
    }

    /// Whether the icon should be drawn in its dim frame.
    pub fn dimmed(&self) -> bool {
        self.blink && self.state == TrayIconState::Recording
    }
}
