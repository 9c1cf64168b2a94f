use serde::Serialize;
use std::sync::{Mutex, PoisonError};

/// Destination for user-facing report lines.
///
/// Both sinks default to doing nothing, so an implementation only needs to
/// override the ones it cares about.
pub trait ReportLogger: Send + Sync {
    fn info(&self, _line: &str) {}
    fn error(&self, _line: &str) {}
}

/// Discards everything. Default when the caller gives no logger.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl ReportLogger for NoopLogger {}

/// Writes `info` lines to stdout and `error` lines to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdioLogger;

impl ReportLogger for StdioLogger {
    fn info(&self, line: &str) {
        println!("{}", line);
    }

    fn error(&self, line: &str) {
        eprintln!("{}", line);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sink {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogLine {
    pub sink: Sink,
    pub line: String,
}

/// Keeps every line in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    lines: Mutex<Vec<LogLine>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, sink: Sink, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogLine {
                sink,
                line: line.to_string(),
            });
    }

    pub fn history(&self) -> Vec<LogLine> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn lines_for(&self, sink: Sink) -> Vec<String> {
        self.history()
            .into_iter()
            .filter(|entry| entry.sink == sink)
            .map(|entry| entry.line)
            .collect()
    }

    pub fn info_lines(&self) -> Vec<String> {
        self.lines_for(Sink::Info)
    }

    pub fn error_lines(&self) -> Vec<String> {
        self.lines_for(Sink::Error)
    }
}

impl ReportLogger for MemoryLogger {
    fn info(&self, line: &str) {
        self.push(Sink::Info, line);
    }

    fn error(&self, line: &str) {
        self.push(Sink::Error, line);
    }
}
