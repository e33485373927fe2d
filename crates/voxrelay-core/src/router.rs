//! Executes the routing decision for a parsed transcript.

use crate::{
    CoreResult,
    collaborators::{Feedback, OutputSink, TextRefiner},
    command::{Command, ParsedCommand},
    deadline::within,
};

use std::{sync::Arc, time::Duration};

use tracing::{info, instrument, warn};

/// Text that reached the user and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// The command that was executed.
    pub command: Command,
    /// The text that was typed or copied (refined when the command refines).
    pub text: String,
}

/// Sends transcripts to the focused window or the clipboard, optionally
/// through the refiner first. Typing and copying never both happen.
pub struct ActionRouter {
    refiner: Arc<dyn TextRefiner>,
    output: Arc<dyn OutputSink>,
    refine_timeout: Option<Duration>,
}

impl ActionRouter {
    /// Create a router over the given collaborators.
    pub fn new(
        refiner: Arc<dyn TextRefiner>,
        output: Arc<dyn OutputSink>,
        refine_timeout: Option<Duration>,
    ) -> Self {
        Self {
            refiner,
            output,
            refine_timeout,
        }
    }

    /// Execute `parsed`.
    ///
    /// A refinement failure aborts before anything is typed or copied.
    #[instrument(skip(self, parsed), fields(command = ?parsed.command))]
    pub async fn route(&self, parsed: &ParsedCommand) -> CoreResult<Delivery> {
        let text = if parsed.command.refines() {
            self.refine(&parsed.text).await?
        } else {
            parsed.text.clone()
        };

        if parsed.command.copies() {
            self.output.copy_to_clipboard(&text).await?;
            info!(text_len = text.len(), "Copied to clipboard");
        } else {
            self.output.type_text(&text).await?;
            info!(text_len = text.len(), "Typed into focused window");
        }

        Ok(Delivery {
            command: parsed.command,
            text,
        })
    }

    async fn refine(&self, text: &str) -> CoreResult<String> {
        if let Err(e) = self.output.show_feedback(Feedback::Refining).await {
            warn!(error = ?e, "Failed to show refining indicator");
        }

        let refined = within("refinement", self.refine_timeout, self.refiner.refine(text)).await;

        // The indicator must be gone before the result or the error surfaces.
        if let Err(e) = self.output.clear_feedback().await {
            warn!(error = ?e, "Failed to clear refining indicator");
        }

        let refined = refined?;
        info!(
            original_len = text.len(),
            refined_len = refined.len(),
            "Transcript refined"
        );
        Ok(refined)
    }
}
