use crate::{AppError, AppResult};

use std::panic::Location;

use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use error_location::ErrorLocation;
use tracing::debug;

/// Modifiers the user may still be holding from the hotkey chord.
const HELD_MODIFIERS: [Key; 4] = [Key::Shift, Key::Control, Key::Alt, Key::Meta];

/// Returns the platform-specific paste modifier key.
///
/// macOS uses Cmd (Meta), Windows and Linux use Ctrl.
pub(crate) fn paste_modifier() -> Key {
    #[cfg(target_os = "macos")]
    {
        Key::Meta
    }
    #[cfg(not(target_os = "macos"))]
    {
        Key::Control
    }
}

/// Create an Enigo instance for one batch of key operations.
#[track_caller]
pub(crate) fn new_enigo() -> AppResult<Enigo> {
    Enigo::new(&Settings::default()).map_err(|e| AppError::KeystrokeFailed {
        reason: format!("Failed to create Enigo: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })
}

/// Release every modifier so synthetic keys are not combined with a chord
/// the user is still physically holding. Failures are ignored per key.
pub(crate) fn release_modifiers(enigo: &mut Enigo) {
    for key in HELD_MODIFIERS {
        if let Err(e) = enigo.key(key, Direction::Release) {
            debug!(key = ?key, error = %e, "Modifier release failed");
        }
    }
}

/// RAII guard that guarantees the paste modifier key is released when dropped.
///
/// Prevents stuck keyboard if operations between key press and release fail or panic.
///
/// Owns the `Enigo` instance so all keyboard operations go through it.
/// On drop, releases the modifier with best-effort semantics.
pub struct PasteKeyGuard {
    enigo: Enigo,
    modifier: Key,
}

impl PasteKeyGuard {
    /// Press the paste modifier on `enigo` and return a guard that will
    /// release it on drop.
    #[track_caller]
    pub(crate) fn press(mut enigo: Enigo) -> AppResult<Self> {
        let modifier = paste_modifier();

        enigo
            .key(modifier, Direction::Press)
            .map_err(|e| AppError::KeystrokeFailed {
                reason: format!("Failed to press paste modifier: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(Self { enigo, modifier })
    }

    /// Click `V` while the modifier is held.
    #[track_caller]
    pub(crate) fn click_paste(&mut self) -> AppResult<()> {
        self.enigo
            .key(Key::Unicode('v'), Direction::Click)
            .map_err(|e| AppError::KeystrokeFailed {
                reason: format!("Failed to press V: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Access the underlying Enigo for additional key operations while modifier is held.
    #[cfg(test)]
    pub(crate) fn enigo_mut(&mut self) -> &mut Enigo {
        &mut self.enigo
    }
}

impl Drop for PasteKeyGuard {
    fn drop(&mut self) {
        let _ = self.enigo.key(self.modifier, Direction::Release);
    }
}
