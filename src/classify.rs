use crate::error::CheckError;
use crate::model::{CheckOutcome, Finding, ReportEntry};

/// Pass/fail verdict for one target plus the entries to record for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub is_pass: bool,
    pub entries: Vec<ReportEntry>,
}

impl Classification {
    /// True when the checker could not evaluate the target at all.
    pub fn is_failure(&self) -> bool {
        self.entries.iter().any(ReportEntry::is_failure)
    }

    pub fn error_count(&self) -> usize {
        self.entries.len()
    }
}

impl From<Result<Vec<Finding>, CheckError>> for CheckOutcome {
    fn from(result: Result<Vec<Finding>, CheckError>) -> Self {
        match result {
            Ok(findings) => CheckOutcome::Findings(findings),
            Err(e) => CheckOutcome::Failure(e.to_string()),
        }
    }
}

/// Decide whether a target passed. Only error-type findings count and only
/// they are kept; warnings and notices are dropped.
pub fn classify(outcome: CheckOutcome) -> Classification {
    match outcome {
        CheckOutcome::Failure(reason) => Classification {
            is_pass: false,
            entries: vec![ReportEntry::failure(reason)],
        },
        CheckOutcome::Findings(findings) => {
            let entries: Vec<ReportEntry> = findings
                .into_iter()
                .filter(Finding::is_error)
                .map(ReportEntry::Finding)
                .collect();
            Classification {
                is_pass: entries.is_empty(),
                entries,
            }
        }
    }
}
