use std::{fmt, time::Instant};

use uuid::Uuid;

/// Where a trigger came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOrigin {
    /// The global hotkey.
    Hotkey,
    /// The tray menu's start/stop item.
    Menu,
}

impl fmt::Display for TriggerOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerOrigin::Hotkey => write!(f, "hotkey"),
            TriggerOrigin::Menu => write!(f, "menu"),
        }
    }
}

/// One admitted request to advance the session.
#[derive(Debug, Clone, Copy)]
pub struct Trigger {
    /// Unique ID for log correlation.
    pub id: Uuid,
    /// Source of the trigger.
    pub origin: TriggerOrigin,
    /// When the trigger was admitted.
    pub received_at: Instant,
}

impl Trigger {
    /// A trigger received now.
    pub fn new(origin: TriggerOrigin) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin,
            received_at: Instant::now(),
        }
    }
}
