//! Clipboard, typing and progress-indicator output.
//!
//! Text is "typed" by pasting: the previous clipboard is saved, the text is
//! written, the paste chord is sent and the previous clipboard is restored
//! after the target has had time to read it. Progress indicators are typed as
//! plain characters and erased with backspaces.

use crate::{
    AppError, AppResult,
    paste_key_guard::{PasteKeyGuard, new_enigo, release_modifiers},
};

use voxrelay_core::{CoreError, CoreResult, Feedback, OutputSink};

use std::{
    panic::Location,
    sync::{
        Mutex, MutexGuard,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use arboard::Clipboard;
use async_trait::async_trait;
use enigo::{Direction, Key, Keyboard};
use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// Time for the OS clipboard manager to take new contents before the
/// paste chord is sent.
pub(crate) const CLIPBOARD_SETTLE_DELAY: Duration = Duration::from_millis(50);

/// Time the focused application gets to read the clipboard after the paste
/// chord is injected, before the previous contents are restored.
///
/// Injection only queues the chord; the target handles it on its own event
/// loop. No platform reports when that has happened, so this is a bound
/// rather than a guarantee. A target stalled for longer pastes the restored
/// text instead.
pub(crate) const PASTE_SETTLE_DELAY: Duration = Duration::from_millis(250);

/// Waits around a clipboard paste.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PasteTiming {
    /// Between writing the clipboard and sending the chord.
    pub clipboard_settle: Duration,
    /// Between the chord and restoring the previous clipboard.
    pub paste_settle: Duration,
}

impl Default for PasteTiming {
    fn default() -> Self {
        Self {
            clipboard_settle: CLIPBOARD_SETTLE_DELAY,
            paste_settle: PASTE_SETTLE_DELAY,
        }
    }
}

/// Clipboard and paste chord of the desktop.
#[async_trait]
pub(crate) trait PasteTarget: Send + Sync {
    /// Current clipboard text.
    fn read_text(&self) -> AppResult<String>;

    /// Replace the clipboard text.
    fn write_text(&self, text: &str) -> AppResult<()>;

    /// Send the paste chord and return once it has been injected.
    async fn send_paste(&self) -> AppResult<()>;
}

/// Paste `text` through `target`, then put back the clipboard the user had.
///
/// The restore waits `timing.paste_settle` after the chord, including when
/// sending it failed part-way.
pub(crate) async fn paste_preserving_clipboard<T>(
    target: &T,
    text: &str,
    timing: PasteTiming,
) -> AppResult<()>
where
    T: PasteTarget + ?Sized,
{
    let previous = match target.read_text() {
        Ok(previous) => Some(previous),
        Err(e) => {
            debug!(error = ?e, "No text on clipboard to restore");
            None
        }
    };

    target.write_text(text)?;
    tokio::time::sleep(timing.clipboard_settle).await;

    let pasted = target.send_paste().await;

    if let Some(previous) = previous {
        tokio::time::sleep(timing.paste_settle).await;
        if let Err(e) = target.write_text(&previous) {
            warn!(error = ?e, "Failed to restore previous clipboard");
        }
    }

    pasted
}

/// Output handler for clipboard, paste and indicator operations.
pub struct OutputHandler {
    clipboard: Mutex<Clipboard>,
    progress_indicators: bool,
    /// Characters of the indicator currently visible in the target.
    shown_chars: AtomicUsize,
}

impl OutputHandler {
    /// Create a new output handler.
    #[track_caller]
    #[instrument]
    pub fn new(progress_indicators: bool) -> AppResult<Self> {
        let clipboard = Clipboard::new().map_err(|e| AppError::ClipboardError {
            reason: format!("Failed to initialize clipboard: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(progress_indicators, "OutputHandler initialized");

        Ok(Self {
            clipboard: Mutex::new(clipboard),
            progress_indicators,
            shown_chars: AtomicUsize::new(0),
        })
    }

    /// Paste `text` into the focused window, preserving the clipboard.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn paste_text(&self, text: &str) -> AppResult<()> {
        paste_preserving_clipboard(self, text, PasteTiming::default()).await?;
        debug!("Text pasted");
        Ok(())
    }

    #[track_caller]
    pub(crate) fn set_clipboard(&self, text: &str) -> AppResult<()> {
        self.lock_clipboard()
            .set_text(text)
            .map_err(|e| AppError::ClipboardError {
                reason: format!("Failed to set clipboard: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    #[track_caller]
    pub(crate) fn get_clipboard(&self) -> AppResult<String> {
        self.lock_clipboard()
            .get_text()
            .map_err(|e| AppError::ClipboardError {
                reason: format!("Failed to read clipboard: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    // Clipboard calls are self-contained; a poisoned lock holds no partial state.
    fn lock_clipboard(&self) -> MutexGuard<'_, Clipboard> {
        self.clipboard.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[instrument]
    async fn press_paste_chord() -> AppResult<()> {
        // Enigo is not Send, so each blocking task builds its own instance.
        // PasteKeyGuard releases the modifier even if the click fails.
        Self::run_keys(|| {
            let mut enigo = new_enigo()?;
            release_modifiers(&mut enigo);

            let mut guard = PasteKeyGuard::press(enigo)?;
            guard.click_paste()
        })
        .await
    }

    async fn type_chars(text: &'static str) -> AppResult<()> {
        Self::run_keys(move || {
            let mut enigo = new_enigo()?;
            release_modifiers(&mut enigo);

            enigo.text(text).map_err(|e| AppError::KeystrokeFailed {
                reason: format!("Failed to type indicator: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
        })
        .await
    }

    async fn erase_chars(count: usize) -> AppResult<()> {
        Self::run_keys(move || {
            let mut enigo = new_enigo()?;
            for _ in 0..count {
                enigo
                    .key(Key::Backspace, Direction::Click)
                    .map_err(|e| AppError::KeystrokeFailed {
                        reason: format!("Failed to erase indicator: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    })?;
            }
            Ok(())
        })
        .await
    }

    /// Run keyboard work on the blocking pool and wait for it to finish.
    async fn run_keys<F>(keys: F) -> AppResult<()>
    where
        F: FnOnce() -> AppResult<()> + Send + 'static,
    {
        tokio::task::spawn_blocking(keys)
            .await
            .map_err(|e| AppError::KeystrokeFailed {
                reason: format!("Keyboard task panicked: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
    }

    async fn erase_indicator(&self) -> AppResult<()> {
        let shown = self.shown_chars.swap(0, Ordering::SeqCst);
        if shown > 0 {
            Self::erase_chars(shown).await?;
            debug!(chars = shown, "Indicator erased");
        }
        Ok(())
    }
}

#[async_trait]
impl PasteTarget for OutputHandler {
    fn read_text(&self) -> AppResult<String> {
        self.get_clipboard()
    }

    fn write_text(&self, text: &str) -> AppResult<()> {
        self.set_clipboard(text)
    }

    async fn send_paste(&self) -> AppResult<()> {
        Self::press_paste_chord().await
    }
}

fn output_error(error: AppError) -> CoreError {
    CoreError::output(error.to_string())
}

#[async_trait]
impl OutputSink for OutputHandler {
    async fn type_text(&self, text: &str) -> CoreResult<()> {
        self.paste_text(text).await.map_err(output_error)
    }

    async fn copy_to_clipboard(&self, text: &str) -> CoreResult<()> {
        self.set_clipboard(text).map_err(output_error)?;
        debug!(text_len = text.len(), "Text copied to clipboard");
        Ok(())
    }

    async fn read_clipboard(&self) -> CoreResult<String> {
        self.get_clipboard().map_err(output_error)
    }

    async fn show_feedback(&self, feedback: Feedback) -> CoreResult<()> {
        if !self.progress_indicators {
            return Ok(());
        }

        // Only one indicator is visible at a time.
        self.erase_indicator().await.map_err(output_error)?;

        let label = feedback.label();
        Self::type_chars(label).await.map_err(output_error)?;
        self.shown_chars
            .store(label.chars().count(), Ordering::SeqCst);

        debug!(indicator = label, "Indicator shown");
        Ok(())
    }

    async fn clear_feedback(&self) -> CoreResult<()> {
        self.erase_indicator().await.map_err(output_error)
    }
}
