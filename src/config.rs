use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{BatchError, ConfigError};
use crate::logger::{NoopLogger, ReportLogger};
use crate::model::Target;

// Batch defaults
pub const DEFAULT_CONCURRENCY: usize = 2;
pub const DEFAULT_WRAP_WIDTH: usize = 80;

// Rendering constants
pub const WRAP_INDENT: usize = 3;

// CLI defaults
pub const DEFAULT_CONFIG_FILE: &str = ".a11y-batch.json";
pub const DEFAULT_CHECKER_PROGRAM: &str = "pa11y";

/// Runs accessibility checks against a list of URLs and reports the results.
#[derive(Parser, Debug, Clone)]
#[command(name = "a11y-batch", version)]
pub struct CliArgs {
    /// URLs to check; replaces the list from the config file
    pub urls: Vec<String>,

    /// JSON config file with `defaults` and `urls` (default: ./.a11y-batch.json if present)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Print the report as JSON on stdout instead of human-readable text
    #[arg(short = 'j', long = "json")]
    pub json: bool,

    /// Maximum number of checks running at once
    #[arg(long = "concurrency")]
    pub concurrency: Option<usize>,

    /// Column width used to wrap report text
    #[arg(long = "wrap-width")]
    pub wrap_width: Option<usize>,

    /// Checker program invoked once per URL
    #[arg(long = "checker", default_value = DEFAULT_CHECKER_PROGRAM)]
    pub checker: String,

    /// Extra argument for the checker program (repeatable)
    #[arg(long = "checker-arg", allow_hyphen_values = true)]
    pub checker_args: Vec<String>,

    /// Per-URL timeout in milliseconds
    #[arg(long = "timeout-ms")]
    pub timeout_ms: Option<u64>,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,
}

/// Contents of a JSON config file. Every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub defaults: FileDefaults,
    pub urls: Vec<Target>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileDefaults {
    pub concurrency: Option<usize>,
    pub wrap_width: Option<usize>,
    /// Per-URL timeout in milliseconds.
    pub timeout: Option<u64>,
    /// Anything else is passed through to the checker for every target.
    #[serde(flatten)]
    pub checker_options: Map<String, Value>,
}

impl FileConfig {
    /// Targets with the file's checker options filled in underneath each one's own.
    pub fn targets(&self) -> Vec<Target> {
        self.urls
            .iter()
            .cloned()
            .map(|target| target.with_defaults(&self.defaults.checker_options))
            .collect()
    }
}

pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ConfigError::NotFound(path.to_path_buf())
        } else {
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the config named on the command line, or the default file when it exists.
pub fn load_config_for(args: &CliArgs) -> Result<FileConfig, ConfigError> {
    match &args.config {
        Some(path) => load_config(path),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                load_config(default_path)
            } else {
                Ok(FileConfig::default())
            }
        }
    }
}

/// Options for one batch run, merged once at the entry point.
#[derive(Clone)]
pub struct RunOptions {
    pub concurrency: usize,
    pub wrap_width: usize,
    pub color: bool,
    pub logger: Arc<dyn ReportLogger>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            wrap_width: DEFAULT_WRAP_WIDTH,
            color: true,
            logger: Arc::new(NoopLogger),
        }
    }
}

impl fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunOptions")
            .field("concurrency", &self.concurrency)
            .field("wrap_width", &self.wrap_width)
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}

impl RunOptions {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_wrap_width(mut self, wrap_width: usize) -> Self {
        self.wrap_width = wrap_width;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn ReportLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn validate(&self) -> Result<(), BatchError> {
        if self.concurrency == 0 {
            return Err(BatchError::InvalidConcurrency);
        }
        let min = WRAP_INDENT + 1;
        if self.wrap_width < min {
            return Err(BatchError::InvalidWrapWidth {
                min,
                got: self.wrap_width,
            });
        }
        Ok(())
    }
}

/// Everything the binary needs, with CLI flags taking precedence over the
/// config file and the file over built-in defaults.
#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub targets: Vec<Target>,
    pub concurrency: usize,
    pub wrap_width: usize,
    pub timeout: Option<Duration>,
    pub color: bool,
    pub json: bool,
    pub checker_program: String,
    pub checker_args: Vec<String>,
}

impl BatchSettings {
    pub fn resolve(args: &CliArgs, file: &FileConfig, no_color_env: bool) -> Self {
        let targets = if args.urls.is_empty() {
            file.targets()
        } else {
            args.urls
                .iter()
                .map(|url| Target::from(url.as_str()).with_defaults(&file.defaults.checker_options))
                .collect()
        };

        Self {
            targets,
            concurrency: args
                .concurrency
                .or(file.defaults.concurrency)
                .unwrap_or(DEFAULT_CONCURRENCY),
            wrap_width: args
                .wrap_width
                .or(file.defaults.wrap_width)
                .unwrap_or(DEFAULT_WRAP_WIDTH),
            timeout: args
                .timeout_ms
                .or(file.defaults.timeout)
                .map(Duration::from_millis),
            color: !(args.no_color || args.json || no_color_env),
            json: args.json,
            checker_program: args.checker.clone(),
            checker_args: args.checker_args.clone(),
        }
    }

    pub fn run_options(&self, logger: Arc<dyn ReportLogger>) -> RunOptions {
        RunOptions::default()
            .with_concurrency(self.concurrency)
            .with_wrap_width(self.wrap_width)
            .with_color(self.color)
            .with_logger(logger)
    }
}
