use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info};

use crate::aggregate::ReportAggregator;
use crate::checker::Checker;
use crate::classify::Classification;
use crate::config::RunOptions;
use crate::dispatch::{CompletionHandler, Dispatcher};
use crate::error::BatchError;
use crate::logger::ReportLogger;
use crate::model::{Report, Target};
use crate::render::{progress_header, progress_line, render, RenderOptions};

/// Completion handler for a batch: records into the shared report and writes
/// a progress line per target.
struct BatchHandler {
    aggregator: ReportAggregator,
    logger: Arc<dyn ReportLogger>,
    color: bool,
}

impl CompletionHandler for BatchHandler {
    fn on_each_complete(
        &self,
        url: &str,
        classification: Classification,
    ) -> Result<(), BatchError> {
        let (to_error, line) = progress_line(url, &classification, self.color);
        if to_error {
            self.logger.error(&line);
        } else {
            self.logger.info(&line);
        }
        self.aggregator
            .record(url, classification.is_pass, classification.entries)
    }

    fn on_all_complete(&self) {
        let report = self.aggregator.snapshot();
        info!(
            "Batch complete: {}/{} targets passed",
            report.passes, report.total
        );
    }
}

fn ensure_unique_urls(targets: &[Target]) -> Result<(), BatchError> {
    let mut seen = HashSet::with_capacity(targets.len());
    for target in targets {
        if !seen.insert(target.url()) {
            error!("Target {} is listed more than once", target.url());
            return Err(BatchError::DuplicateTarget(target.url().to_string()));
        }
    }
    Ok(())
}

/// Check every target and return the finished report.
///
/// Targets that cannot be checked are recorded as failures in the report.
/// The error arm is only for invalid options, repeated target URLs, and
/// broken internal invariants. The rendered report goes to the logger's
/// `info` sink when everything passed and to `error` otherwise.
pub async fn run<C: Checker>(
    targets: Vec<Target>,
    checker: Arc<C>,
    options: RunOptions,
) -> Result<Report, BatchError> {
    options.validate()?;
    ensure_unique_urls(&targets)?;
    let dispatcher = Dispatcher::new(options.concurrency)?;

    info!(
        "Running {} targets with concurrency {}",
        targets.len(),
        dispatcher.concurrency()
    );
    options
        .logger
        .info(&progress_header(targets.len(), options.color));

    let handler = Arc::new(BatchHandler {
        aggregator: ReportAggregator::new(targets.len()),
        logger: options.logger.clone(),
        color: options.color,
    });

    dispatcher.dispatch(targets, checker, handler.clone()).await?;
    let report = handler.aggregator.finish()?;

    let rendered = render(
        &report,
        &RenderOptions {
            wrap_width: options.wrap_width,
            color: options.color,
        },
    );
    rendered.emit(options.logger.as_ref());

    Ok(report)
}
