pub mod command;

use std::future::Future;

use crate::error::CheckError;
use crate::model::{Finding, Target};

pub use command::CommandChecker;

/// Evaluates a single target.
///
/// Implementations do the actual page loading and rule evaluation; the batch
/// runner only consumes the result. An `Err` is recorded as a failed check
/// for that target and never stops the batch.
pub trait Checker: Send + Sync + 'static {
    fn check(
        &self,
        target: &Target,
    ) -> impl Future<Output = Result<Vec<Finding>, CheckError>> + Send;
}
