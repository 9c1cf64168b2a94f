use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, error};

use crate::checker::Checker;
use crate::classify::{classify, Classification};
use crate::error::BatchError;
use crate::model::{CheckOutcome, Target};

/// Receives classified completions from the dispatcher.
pub trait CompletionHandler: Send + Sync + 'static {
    /// Called once per target, from whichever worker finished it.
    fn on_each_complete(&self, url: &str, classification: Classification)
        -> Result<(), BatchError>;

    /// Called exactly once, after every `on_each_complete` has returned.
    fn on_all_complete(&self);
}

/// Runs a checker over a list of targets with a fixed number of workers.
///
/// Workers claim targets in input order from a shared cursor, so start order
/// follows the list while completion order is whatever the checks produce.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    concurrency: usize,
}

impl Dispatcher {
    pub fn new(concurrency: usize) -> Result<Self, BatchError> {
        if concurrency == 0 {
            return Err(BatchError::InvalidConcurrency);
        }
        Ok(Self { concurrency })
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Check every target and hand each result to `handler`.
    ///
    /// A failing check never stops the batch. Errors returned by the handler
    /// are logged, the remaining targets still run, and the first such error
    /// is returned once everything has finished.
    pub async fn dispatch<C, H>(
        &self,
        targets: Vec<Target>,
        checker: Arc<C>,
        handler: Arc<H>,
    ) -> Result<(), BatchError>
    where
        C: Checker,
        H: CompletionHandler,
    {
        let targets: Arc<[Target]> = targets.into();
        let cursor = Arc::new(AtomicUsize::new(0));
        let workers = self.concurrency.min(targets.len());

        debug!(
            "Dispatching {} targets across {} workers",
            targets.len(),
            workers
        );

        let handles: Vec<_> = (0..workers)
            .map(|worker_id| {
                tokio::spawn(run_worker(
                    worker_id,
                    targets.clone(),
                    cursor.clone(),
                    checker.clone(),
                    handler.clone(),
                ))
            })
            .collect();

        let mut first_error = None;
        for joined in futures::future::join_all(handles).await {
            match joined {
                Ok(None) => {}
                Ok(Some(e)) => {
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    error!("Check worker did not finish: {}", e);
                    first_error.get_or_insert(BatchError::Worker(e));
                }
            }
        }

        handler.on_all_complete();

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

async fn run_worker<C, H>(
    worker_id: usize,
    targets: Arc<[Target]>,
    cursor: Arc<AtomicUsize>,
    checker: Arc<C>,
    handler: Arc<H>,
) -> Option<BatchError>
where
    C: Checker,
    H: CompletionHandler,
{
    let mut first_error = None;

    loop {
        let index = cursor.fetch_add(1, Ordering::SeqCst);
        let Some(target) = targets.get(index) else {
            break;
        };
        let url = target.url();

        debug!("Worker {} checking {} ({}/{})", worker_id, url, index + 1, targets.len());
        let outcome = CheckOutcome::from(checker.check(target).await);
        let classification = classify(outcome);

        if let Err(e) = handler.on_each_complete(url, classification) {
            error!("Worker {} could not record {}: {}", worker_id, url, e);
            first_error.get_or_insert(e);
        }
    }

    debug!("Worker {} exiting", worker_id);
    first_error
}
