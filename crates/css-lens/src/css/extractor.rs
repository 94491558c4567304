use std::process::Stdio;

use tokio::{io::AsyncWriteExt, process::Command};
use tower_lsp::async_trait;

use super::rules::RuleSet;

/// Executable used when no extractor command is configured.
pub const DEFAULT_EXTRACTOR_COMMAND: &str = "css-lens-extract";

/// Turns stylesheet text into rules.
///
/// The actual CSS parser lives outside this crate. Implementations may run
/// in-process (any `Fn(&str) -> Result<RuleSet, ExtractionError>` closure is
/// an extractor) or out of process, see [`CommandExtractor`].
#[async_trait]
pub trait RuleExtractor: Send + Sync {
    async fn extract(
        &self,
        css_source: &str,
    ) -> Result<RuleSet, ExtractionError>;
}

#[async_trait]
impl<F> RuleExtractor for F
where
    F: Fn(&str) -> Result<RuleSet, ExtractionError> + Send + Sync,
{
    async fn extract(
        &self,
        css_source: &str,
    ) -> Result<RuleSet, ExtractionError> {
        (self)(css_source)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("{0} is not available")]
    CommandNotFound(String),
    #[error("failed to launch {command}: {reason}")]
    LaunchFailed { command: String, reason: String },
    #[error("{command} failed: {reason}")]
    ExtractorFailed { command: String, reason: String },
    #[error("extractor returned malformed rule data: {0}")]
    MalformedOutput(String),
    #[error("invalid stylesheet: {0}")]
    InvalidCss(String),
}

/// Runs an external extractor process.
///
/// The stylesheet is streamed to the process on stdin; stdout must be the
/// JSON rule list (`{ "rules": [{ "selector": ..., "declarations": [...] }] }`).
/// The child is killed if the extraction future is dropped, which is how
/// timeouts and superseded runs cancel it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandExtractor {
    command: String,
    args: Vec<String>,
}

impl Default for CommandExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_EXTRACTOR_COMMAND, Vec::new())
    }
}

impl CommandExtractor {
    pub fn new(
        command: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

#[async_trait]
impl RuleExtractor for CommandExtractor {
    async fn extract(
        &self,
        css_source: &str,
    ) -> Result<RuleSet, ExtractionError> {
        let output = run_extractor(&self.command, &self.args, css_source).await?;
        RuleSet::from_json(&output).map_err(|error| ExtractionError::MalformedOutput(error.to_string()))
    }
}

async fn run_extractor(
    executable: &str,
    args: &[String],
    input: &str,
) -> Result<String, ExtractionError> {
    let mut child = Command::new(executable)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|error| match error.kind() {
            std::io::ErrorKind::NotFound => ExtractionError::CommandNotFound(executable.to_string()),
            _ => ExtractionError::LaunchFailed {
                command: executable.to_string(),
                reason: error.to_string(),
            },
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.as_bytes()).await.map_err(|error| ExtractionError::LaunchFailed {
            command: executable.to_string(),
            reason: format!("failed to stream stylesheet to extractor: {error}"),
        })?;
    }

    let output = child.wait_with_output().await.map_err(|error| ExtractionError::LaunchFailed {
        command: executable.to_string(),
        reason: error.to_string(),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(ExtractionError::ExtractorFailed {
            command: executable.to_string(),
            reason: if stderr.is_empty() {
                format!("process exited with status {}", output.status)
            } else {
                stderr
            },
        });
    }

    String::from_utf8(output.stdout).map_err(|error| ExtractionError::ExtractorFailed {
        command: executable.to_string(),
        reason: format!("extractor produced invalid UTF-8 output: {error}"),
    })
}

#[cfg(test)]
#[path = "../../tests/src/css/extractor_tests.rs"]
mod tests;
