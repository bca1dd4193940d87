//! logsweep - main entry point.
//!
//! Loads the retention config, archives stale log files in every configured
//! directory and exits non-zero on the first failure.

use anyhow::Result;
use clap::Parser;

use logsweep_cli::cli::{Cli, execute};

fn main() -> Result<()> {
    let cli = Cli::parse();
    execute(cli)
}
