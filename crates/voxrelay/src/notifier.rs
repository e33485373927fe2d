use voxrelay_core::NotificationSink;

use notify_rust::{Notification, Timeout};
use tracing::{info, warn};

/// Application name shown on notifications.
const APP_NAME: &str = "voxrelay";

/// [`NotificationSink`] backed by the desktop notification service.
#[derive(Debug, Default)]
pub struct DesktopNotifier;

impl NotificationSink for DesktopNotifier {
    fn show_error(&self, title: &str, message: &str) {
        let shown = Notification::new()
            .appname(APP_NAME)
            .summary(title)
            .body(message)
            .timeout(Timeout::Never)
            .show();

        match shown {
            Ok(_) => info!(title, "Error notification shown"),
            Err(e) => warn!(title, error = %e, "Failed to show notification"),
        }
    }
}
