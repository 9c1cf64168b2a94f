use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Targets
// ============================================================================

/// A single URL submitted for checking, optionally with checker options.
///
/// Deserializes from either a bare string or an object with a `url` key;
/// every other key of the object is kept verbatim for the checker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Target {
    Url(String),
    Detailed {
        url: String,
        #[serde(flatten)]
        options: Map<String, Value>,
    },
}

impl Target {
    /// Canonical URL, used as the report key.
    pub fn url(&self) -> &str {
        match self {
            Target::Url(url) => url,
            Target::Detailed { url, .. } => url,
        }
    }

    /// Per-target checker options. Bare URLs have none.
    pub fn options(&self) -> Option<&Map<String, Value>> {
        match self {
            Target::Url(_) => None,
            Target::Detailed { options, .. } => Some(options),
        }
    }

    /// Fill in any option the target does not set itself from `defaults`.
    pub fn with_defaults(self, defaults: &Map<String, Value>) -> Target {
        if defaults.is_empty() {
            return self;
        }
        let (url, own) = match self {
            Target::Url(url) => (url, Map::new()),
            Target::Detailed { url, options } => (url, options),
        };
        let mut options = defaults.clone();
        options.extend(own);
        Target::Detailed { url, options }
    }
}

impl From<&str> for Target {
    fn from(url: &str) -> Self {
        Target::Url(url.to_string())
    }
}

impl From<String> for Target {
    fn from(url: String) -> Self {
        Target::Url(url)
    }
}

// ============================================================================
// Findings and outcomes
// ============================================================================

/// Severity of a finding. Checkers may report types beyond the usual three;
/// those are kept as written and never count as errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingType {
    Error,
    Warning,
    Notice,
    #[serde(untagged)]
    Other(String),
}

/// One issue the checker reported for a target.
///
/// Keys the checker adds beyond the common ones (`runner`, `runnerExtras`, ...)
/// are carried in `extra` and written back out unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(rename = "type")]
    pub kind: FindingType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_code: Option<u8>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Finding {
    pub fn new(kind: FindingType, message: impl Into<String>) -> Self {
        Self {
            code: None,
            context: None,
            message: message.into(),
            selector: None,
            kind,
            type_code: None,
            extra: Map::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == FindingType::Error
    }
}

/// Raw result of checking one target, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The target could not be checked at all.
    Failure(String),
    Findings(Vec<Finding>),
}

// ============================================================================
// Report
// ============================================================================

/// A recorded entry for a target: either a finding or the reason the check failed.
///
/// A failure serializes as `{ "message": ... }`. `Finding` is tried first when
/// deserializing because it is the only shape carrying a `type` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportEntry {
    Finding(Finding),
    Failure { message: String },
}

impl ReportEntry {
    pub fn failure(message: impl Into<String>) -> Self {
        ReportEntry::Failure {
            message: message.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ReportEntry::Failure { .. })
    }
}

/// Aggregate result of a batch run.
///
/// `results` keeps completion order. An empty entry list means the target passed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub total: usize,
    pub passes: usize,
    pub results: IndexMap<String, Vec<ReportEntry>>,
}

impl Report {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            passes: 0,
            results: IndexMap::with_capacity(total),
        }
    }

    pub fn all_passed(&self) -> bool {
        self.passes == self.total
    }

    pub fn pass_ratio(&self) -> String {
        format!("{}/{} URLs passed", self.passes, self.total)
    }
}
