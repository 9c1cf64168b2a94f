// Library crate; main.rs is a thin CLI over `runner::run`.

pub mod aggregate;
pub mod checker;
pub mod classify;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logger;
pub mod model;
pub mod render;
pub mod runner;

pub use checker::{Checker, CommandChecker};
pub use config::RunOptions;
pub use error::{BatchError, CheckError};
pub use model::{CheckOutcome, Finding, FindingType, Report, ReportEntry, Target};
pub use runner::run;
