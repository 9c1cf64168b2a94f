use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

use a11y_batch::config::{load_config_for, BatchSettings, CliArgs};
use a11y_batch::logger::{NoopLogger, ReportLogger, StdioLogger};
use a11y_batch::CommandChecker;

// Exit code when at least one URL did not pass.
const EXIT_FAILED_CHECKS: i32 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Diagnostics go to stderr so `--json` output on stdout stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "a11y_batch=warn".into()),
        )
        .init();

    let args = CliArgs::parse();
    let file_config = load_config_for(&args)?;
    let settings = BatchSettings::resolve(
        &args,
        &file_config,
        std::env::var_os("NO_COLOR").is_some(),
    );
    info!("Checker: {} {:?}", settings.checker_program, settings.checker_args);

    if settings.targets.is_empty() {
        warn!("No URLs given on the command line or in the config file");
    }

    let checker = CommandChecker::new(settings.checker_program.clone())
        .with_args(settings.checker_args.clone())
        .with_timeout(settings.timeout);

    let logger: Arc<dyn ReportLogger> = if settings.json {
        Arc::new(NoopLogger)
    } else {
        Arc::new(StdioLogger)
    };

    let report = a11y_batch::run(
        settings.targets.clone(),
        Arc::new(checker),
        settings.run_options(logger),
    )
    .await?;

    if settings.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if !report.all_passed() {
        std::process::exit(EXIT_FAILED_CHECKS);
    }
    Ok(())
}
