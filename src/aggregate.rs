use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::error;

use crate::error::BatchError;
use crate::model::{Report, ReportEntry};

/// The single mutable report shared by every in-flight completion.
///
/// Inserting a target's entries and bumping `passes` happen under one lock,
/// so no observer ever sees one without the other.
#[derive(Debug)]
pub struct ReportAggregator {
    report: Mutex<Report>,
}

impl ReportAggregator {
    pub fn new(total: usize) -> Self {
        Self {
            report: Mutex::new(Report::new(total)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Report> {
        self.report.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the outcome for `url`. Each target is recorded exactly once; a
    /// second write for the same URL is rejected and the first one kept.
    pub fn record(
        &self,
        url: &str,
        is_pass: bool,
        entries: Vec<ReportEntry>,
    ) -> Result<(), BatchError> {
        let mut report = self.lock();
        if report.results.contains_key(url) {
            error!("Refusing to record {} twice; keeping the first result", url);
            return Err(BatchError::DuplicateRecord(url.to_string()));
        }
        if is_pass {
            report.passes += 1;
        }
        report.results.insert(url.to_string(), entries);
        Ok(())
    }

    pub fn snapshot(&self) -> Report {
        self.lock().clone()
    }

    /// Take the finished report out, checking every target was recorded.
    pub fn finish(&self) -> Result<Report, BatchError> {
        let report = std::mem::take(&mut *self.lock());
        if report.results.len() != report.total {
            error!(
                "Batch finished with {} of {} targets recorded",
                report.results.len(),
                report.total
            );
            return Err(BatchError::IncompleteReport {
                recorded: report.results.len(),
                total: report.total,
            });
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_record_pass_and_fail() {
        let aggregator = ReportAggregator::new(2);
        aggregator.record("http://a", true, vec![]).unwrap();
        aggregator
            .record("http://b", false, vec![ReportEntry::failure("down")])
            .unwrap();

        let report = aggregator.finish().unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.passes, 1);
        assert!(report.results["http://a"].is_empty());
        assert_eq!(report.results["http://b"].len(), 1);
    }

    #[test]
    fn test_duplicate_record_keeps_first() {
        let aggregator = ReportAggregator::new(1);
        aggregator.record("http://a", false, vec![ReportEntry::failure("down")]).unwrap();

        let err = aggregator.record("http://a", true, vec![]).unwrap_err();
        assert!(matches!(err, BatchError::DuplicateRecord(ref url) if url == "http://a"));

        let report = aggregator.snapshot();
        assert_eq!(report.passes, 0);
        assert_eq!(report.results["http://a"], vec![ReportEntry::failure("down")]);
    }

    #[test]
    fn test_finish_detects_missing_targets() {
        let aggregator = ReportAggregator::new(3);
        aggregator.record("http://a", true, vec![]).unwrap();

        let err = aggregator.finish().unwrap_err();
        assert!(matches!(
            err,
            BatchError::IncompleteReport {
                recorded: 1,
                total: 3
            }
        ));
    }

    #[test]
    fn test_results_keep_completion_order() {
        let aggregator = ReportAggregator::new(3);
        for url in ["http://c", "http://a", "http://b"] {
            aggregator.record(url, true, vec![]).unwrap();
        }
        let keys: Vec<_> = aggregator.snapshot().results.keys().cloned().collect();
        assert_eq!(keys, vec!["http://c", "http://a", "http://b"]);
    }

    #[test]
    fn test_concurrent_records_are_not_lost() {
        let aggregator = Arc::new(ReportAggregator::new(64));
        let handles: Vec<_> = (0..64)
            .map(|i| {
                let aggregator = aggregator.clone();
                std::thread::spawn(move || {
                    aggregator
                        .record(&format!("http://host/{}", i), i % 2 == 0, vec![])
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let report = aggregator.finish().unwrap();
        assert_eq!(report.results.len(), 64);
        assert_eq!(report.passes, 32);
    }
}
