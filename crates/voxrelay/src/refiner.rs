//! Transcript rephrasing through an external command-line tool.

use voxrelay_core::{CoreError, CoreResult, TextRefiner};

use std::{process::Stdio, time::Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

/// Longest stderr excerpt carried into an error message.
const STDERR_SNIPPET_CHARS: usize = 200;

/// [`TextRefiner`] that runs `program --print --system-prompt <prompt> -p <text>`
/// and takes trimmed stdout as the refined text.
///
/// The child is killed if the returned future is dropped, so the stage
/// timeout also ends the process.
pub struct CliRefiner {
    program: String,
    system_prompt: String,
}

impl CliRefiner {
    /// Create a refiner for `program`.
    pub fn new(program: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            system_prompt: system_prompt.into(),
        }
    }

    fn command(&self, text: &str) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("--print")
            .arg("--system-prompt")
            .arg(&self.system_prompt)
            .arg("-p")
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl TextRefiner for CliRefiner {
    #[instrument(skip(self, text), fields(program = %self.program, text_len = text.len()))]
    async fn refine(&self, text: &str) -> CoreResult<String> {
        let start = Instant::now();

        let output = self.command(text).output().await.map_err(|e| {
            CoreError::refinement(format!("Failed to run '{}': {}", self.program, e))
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        debug!(
            status = %output.status,
            stdout_len = stdout.len(),
            stderr_len = stderr.len(),
            duration_ms = start.elapsed().as_millis(),
            "Refiner exited"
        );

        if !output.status.success() {
            let snippet: String = stderr.trim().chars().take(STDERR_SNIPPET_CHARS).collect();
            warn!(status = %output.status, stderr = %snippet, "Refiner failed");
            return Err(CoreError::refinement(format!(
                "'{}' exited with {}: {}",
                self.program, output.status, snippet
            )));
        }

        let refined = stdout.trim();
        if refined.is_empty() {
            return Err(CoreError::refinement(format!(
                "'{}' returned an empty response",
                self.program
            )));
        }

        Ok(refined.to_string())
    }
}
