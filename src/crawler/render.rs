//! Browser render fallback
//!
//! Runs an external headless-browser command once per page and uses its
//! stdout as the rendered document. The URL is appended as the last argument.

use crate::FetchError;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;
use url::Url;

/// External command that prints the rendered DOM of a URL
#[derive(Debug, Clone)]
pub struct BrowserRenderer {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl BrowserRenderer {
    /// Builds a renderer from `[program, args...]`
    ///
    /// Returns `None` for an empty command.
    pub fn from_command(command: &[String], timeout: Duration) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            timeout,
        })
    }

    /// Renders `url` and returns the document markup
    ///
    /// # Errors
    ///
    /// `FetchError::Render` when the command cannot be launched, exits with a
    /// failure status, prints nothing, or exceeds the render timeout. The child
    /// process is killed on timeout.
    pub async fn render(&self, url: &Url) -> Result<String, FetchError> {
        let render_error = |message: String| FetchError::Render {
            url: url.to_string(),
            message,
        };

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(url.as_str())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        debug!("Rendering {} with {}", url, self.program);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(render_error(format!(
                    "Failed to launch {}: {}",
                    self.program, e
                )))
            }
            Err(_) => {
                return Err(render_error(format!(
                    "Timed out after {}s",
                    self.timeout.as_secs()
                )))
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(render_error(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.lines().next().unwrap_or_default().trim()
            )));
        }

        let body = String::from_utf8_lossy(&output.stdout).into_owned();
        if body.trim().is_empty() {
            return Err(render_error(format!("{} produced no output", self.program)));
        }

        Ok(body)
    }
}
