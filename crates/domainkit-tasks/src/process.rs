use std::io;
use std::process::Command;

use anyhow::{anyhow, Context, Result};
use tracing::debug;

pub(crate) const REDACTED: &str = "********";

/// Captured result of a finished child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success() -> Self {
        Self {
            code: Some(0),
            ..Self::default()
        }
    }

    pub fn with_code(code: i32) -> Self {
        Self {
            code: Some(code),
            ..Self::default()
        }
    }

    pub fn with_stdout(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Fails unless the exit code is one of `accepted_codes`.
    pub fn ensure_success(&self, context_message: &str, accepted_codes: &[i32]) -> Result<i32> {
        match self.code {
            Some(code) if accepted_codes.contains(&code) => Ok(code),
            code => Err(anyhow!(
                "{context_message}: status={} stdout='{}' stderr='{}'",
                code.map(|value| value.to_string())
                    .unwrap_or_else(|| "terminated by signal".to_string()),
                self.stdout.trim(),
                self.stderr.trim()
            )),
        }
    }
}

/// Runs `command` to completion. Only a failure to start is an error here;
/// callers decide which exit codes count as success.
pub fn execute_command(command: &mut Command, context_message: &str) -> Result<CommandOutput> {
    debug!(command = %render_command(command, &[]), "running external command");
    let output = match command.output() {
        Ok(output) => output,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let program = command.get_program().to_string_lossy().into_owned();
            return Err(err).with_context(|| {
                format!("{context_message}: required tool '{program}' was not found on PATH")
            });
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("{context_message}: command failed to start"));
        }
    };

    Ok(CommandOutput {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Renders a command line for logs and dry runs. Any argument containing one
/// of `secrets` has that value masked.
pub fn render_command(command: &Command, secrets: &[&str]) -> String {
    let mut parts = vec![quote_for_display(
        &command.get_program().to_string_lossy(),
    )];
    for arg in command.get_args() {
        let mut rendered = arg.to_string_lossy().into_owned();
        for secret in secrets.iter().filter(|secret| !secret.is_empty()) {
            rendered = rendered.replace(secret, REDACTED);
        }
        parts.push(quote_for_display(&rendered));
    }
    parts.join(" ")
}

fn quote_for_display(value: &str) -> String {
    if value.is_empty() || value.contains(char::is_whitespace) {
        return format!("\"{}\"", value.replace('"', "\\\""));
    }
    value.to_string()
}
