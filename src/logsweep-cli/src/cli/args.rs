//! CLI argument structures and parsing.

use clap::Parser;
use std::path::PathBuf;

use logsweep_core::CONFIG_FILE_NAME;

/// `--version` output: crate version plus the commit and date stamped by `build.rs`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("LOGSWEEP_BUILD_INFO"),
    ")"
);

/// logsweep - archive and purge stale log files
///
/// Every `.log`/`.txt` file (rotated ones like `app.log.3` included) under the
/// configured directories that is older than the threshold is zipped next to
/// itself and then deleted.
#[derive(Parser, Debug)]
#[command(name = "logsweep")]
#[command(author, version, long_version = LONG_VERSION)]
#[command(about = "Archive and purge stale log files", long_about = None)]
pub struct Cli {
    /// JSON configuration with `DirsToSearch` and `ArchiveThresholdDays`
    #[arg(long, short = 'c', value_name = "PATH", default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// Directory for `logs.log` (defaults to the executable's directory)
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["logsweep"]).unwrap();
        assert_eq!(cli.config, PathBuf::from(CONFIG_FILE_NAME));
        assert!(cli.log_dir.is_none());
    }

    #[test]
    fn test_explicit_paths() {
        let cli = Cli::try_parse_from([
            "logsweep",
            "--config",
            "/etc/logsweep/config.json",
            "--log-dir",
            "/var/log/logsweep",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/logsweep/config.json"));
        assert_eq!(cli.log_dir, Some(PathBuf::from("/var/log/logsweep")));
    }

    #[test]
    fn test_long_version_carries_build_info() {
        let build_info = env!("LOGSWEEP_BUILD_INFO");
        let (commit, date) = build_info.rsplit_once(' ').unwrap();
        assert!(!commit.is_empty());
        assert_eq!(date.len(), "YYYY-MM-DD".len());
        assert_eq!(
            LONG_VERSION,
            format!("{} ({build_info})", env!("CARGO_PKG_VERSION"))
        );
    }

    #[test]
    fn test_version_flag_renders_long_version() {
        let err = Cli::try_parse_from(["logsweep", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
        assert!(err.to_string().contains(LONG_VERSION));
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Cli::try_parse_from(["logsweep", "--dry-run"]).is_err());
    }
}
