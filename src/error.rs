use std::path::PathBuf;

/// Errors from the batch entry point.
///
/// Individual target failures never show up here; they are folded into the
/// report. These are configuration problems or broken dispatcher invariants.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Concurrency must be at least 1")]
    InvalidConcurrency,

    #[error("Wrap width must be at least {min}, got {got}")]
    InvalidWrapWidth { min: usize, got: usize },

    #[error("Duplicate target URL: {0}")]
    DuplicateTarget(String),

    #[error("Result for {0} was recorded twice")]
    DuplicateRecord(String),

    #[error("Report is incomplete: {recorded} of {total} targets recorded")]
    IncompleteReport { recorded: usize, total: usize },

    #[error("Check worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Why a checker could not evaluate a target. The display text becomes the
/// recorded failure message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    #[error("Page \"{0}\" could not be opened")]
    Unreachable(String),

    #[error("Timed out after {elapsed_ms}ms checking \"{url}\"")]
    TimedOut { url: String, elapsed_ms: u64 },

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Config file {0:?} does not exist")]
    NotFound(PathBuf),
}
