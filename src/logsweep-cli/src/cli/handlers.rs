//! Run execution for the parsed CLI.

use anyhow::{Context, Result};
use tracing::debug;

use logsweep_core::{prepare_logging, run};

use super::args::Cli;

/// Prepare logging, run the retention pass and close the log sink.
///
/// The run's error, if any, has already been written to the log file when
/// this returns.
pub fn execute(cli: Cli) -> Result<()> {
    let notifier = prepare_logging(cli.log_dir.as_deref()).context("Failed to prepare logging")?;

    let result = notifier.in_scope(|| {
        debug!(
            config = %cli.config.display(),
            log_file = %notifier.log_path().display(),
            "Starting retention run"
        );
        run(&cli.config, &notifier)
    });
    notifier.close();

    result?;
    Ok(())
}
