/// Clipboard writer with graceful degradation.
///
/// A configured command (e.g. `xclip -selection clipboard`) receives the text on stdin.
/// Without one, the text is sent to the controlling terminal as an OSC 52 sequence.
/// Every outcome maps to a notification; no error leaves this module.
use std::io::{IsTerminal, Write};
use std::process::Stdio;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::CommonError;
use crate::notify::Notification;

/// Common OSC 52 size limit (base64 payload bytes).
pub const MAX_OSC52_PAYLOAD: usize = 74_994;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    Failed,
    Unsupported,
}

impl CopyOutcome {
    pub fn message(self) -> &'static str {
        match self {
            CopyOutcome::Copied => "Answer copied to clipboard",
            CopyOutcome::Failed => "Copy failed",
            CopyOutcome::Unsupported => "Copy not supported",
        }
    }

    pub fn notification(self) -> Notification {
        Notification::new(self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ClipboardCommand {
    program: String,
    args: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    command: Option<ClipboardCommand>,
}

impl Clipboard {
    /// `command` is split on whitespace; `None` or a blank string selects the terminal fallback.
    pub fn new(command: Option<&str>) -> Self {
        let command = command.and_then(|c| {
            let mut parts = c.split_whitespace().map(str::to_string);
            let program = parts.next()?;
            Some(ClipboardCommand {
                program,
                args: parts.collect(),
            })
        });
        Self { command }
    }

    pub fn has_command(&self) -> bool {
        self.command.is_some()
    }

    pub async fn copy(&self, text: &str) -> CopyOutcome {
        if self.command.is_some() {
            return match self.write_via_command(text).await {
                Ok(()) => CopyOutcome::Copied,
                Err(e) => {
                    warn!(error = %e, "clipboard command failed");
                    CopyOutcome::Failed
                }
            };
        }

        match copy_to_terminal(text) {
            Ok(()) => CopyOutcome::Copied,
            Err(e) => {
                debug!(error = %e, "terminal clipboard fallback unusable");
                CopyOutcome::Unsupported
            }
        }
    }

    async fn write_via_command(&self, text: &str) -> Result<(), CommonError> {
        let command = self.command.as_ref().ok_or(CommonError::ClipboardUnavailable)?;

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CommonError::Clipboard(format!("spawn {}: {e}", command.program)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| CommonError::Clipboard("child stdin not captured".to_string()))?;
        stdin
            .write_all(text.as_bytes())
            .await
            .map_err(|e| CommonError::Clipboard(e.to_string()))?;
        drop(stdin);

        let status = child
            .wait()
            .await
            .map_err(|e| CommonError::Clipboard(e.to_string()))?;
        if !status.success() {
            return Err(CommonError::Clipboard(format!(
                "{} exited with {status}",
                command.program
            )));
        }
        Ok(())
    }
}

fn copy_to_terminal(text: &str) -> Result<(), CommonError> {
    let mut stderr = std::io::stderr();
    if !stderr.is_terminal() {
        return Err(CommonError::ClipboardUnavailable);
    }
    write_osc52(&mut stderr, text)
}

/// Writes `text` as an OSC 52 "set clipboard" sequence.
pub fn write_osc52(writer: &mut impl Write, text: &str) -> Result<(), CommonError> {
    let encoded = STANDARD.encode(text.as_bytes());
    if encoded.len() > MAX_OSC52_PAYLOAD {
        return Err(CommonError::Clipboard(format!(
            "OSC 52 payload too large ({} > {MAX_OSC52_PAYLOAD})",
            encoded.len()
        )));
    }
    writer
        .write_all(format!("\x1b]52;c;{encoded}\x07").as_bytes())
        .and_then(|()| writer.flush())
        .map_err(|e| CommonError::Clipboard(e.to_string()))
}
