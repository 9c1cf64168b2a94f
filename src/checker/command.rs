use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use super::Checker;
use crate::config::DEFAULT_CHECKER_PROGRAM;
use crate::error::CheckError;
use crate::model::{Finding, Target};

/// Runs an external checker program once per target.
///
/// The program is invoked as `<program> <args...> --reporter json <url>`,
/// receives the target's options as a JSON object on stdin, and must print a
/// JSON array of findings on stdout. The exit status is ignored since
/// checkers commonly exit non-zero when they find issues.
#[derive(Debug, Clone)]
pub struct CommandChecker {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl Default for CommandChecker {
    fn default() -> Self {
        Self::new(DEFAULT_CHECKER_PROGRAM)
    }
}

impl CommandChecker {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn run_program(&self, target: &Target) -> Result<Vec<Finding>, CheckError> {
        let url = target.url();
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .args(["--reporter", "json", url])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                warn!("Failed to spawn checker {:?} for {}: {}", self.program, url, e);
                CheckError::Unreachable(url.to_string())
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            let options = target.options().cloned().unwrap_or_default();
            let payload = serde_json::to_vec(&options)
                .map_err(|e| CheckError::Other(format!("Invalid options for {}: {}", url, e)))?;
            // The checker may not read stdin at all; a closed pipe is fine.
            if let Err(e) = stdin.write_all(&payload).await {
                debug!("Checker did not take options on stdin for {}: {}", url, e);
            }
        }

        let output = child.wait_with_output().await.map_err(|e| {
            warn!("Error waiting for checker on {}: {}", url, e);
            CheckError::Unreachable(url.to_string())
        })?;

        if !output.stderr.is_empty() {
            debug!(
                "Checker stderr for {}: {}",
                url,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        parse_findings(url, &output.stdout)
    }
}

impl Checker for CommandChecker {
    async fn check(&self, target: &Target) -> Result<Vec<Finding>, CheckError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.run_program(target))
                .await
                .map_err(|_| CheckError::TimedOut {
                    url: target.url().to_string(),
                    elapsed_ms: limit.as_millis() as u64,
                })?,
            None => self.run_program(target).await,
        }
    }
}

/// Parse a checker's stdout. Empty or unparsable output means the page could
/// not be checked.
pub fn parse_findings(url: &str, stdout: &[u8]) -> Result<Vec<Finding>, CheckError> {
    let text = String::from_utf8_lossy(stdout);
    let text = text.trim();
    if text.is_empty() {
        debug!("Checker produced no output for {}", url);
        return Err(CheckError::Unreachable(url.to_string()));
    }

    serde_json::from_str(text).map_err(|e| {
        debug!("Unparsable checker output for {}: {}", url, e);
        CheckError::Unreachable(url.to_string())
    })
}
