//! One retention run across every configured directory.

use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};
use tracing::{debug, info};

use crate::Result;
use crate::archiver::{ArchiveReport, archive_and_purge};
use crate::config::RetentionConfig;
use crate::cutoff::Cutoff;
use crate::notifier::Notify;

/// Archive report for a single configured directory.
#[derive(Debug, Clone)]
pub struct DirectoryReport {
    pub directory: PathBuf,
    pub report: ArchiveReport,
}

/// Stats from a full run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Boundary used for every staleness check, RFC 3339.
    pub cutoff: String,
    /// Per-directory results, in configuration order.
    pub directories: Vec<DirectoryReport>,
    /// Duration in milliseconds.
    pub duration_ms: u64,
}

impl RunSummary {
    pub fn files_archived(&self) -> usize {
        self.directories
            .iter()
            .map(|d| d.report.files_archived)
            .sum()
    }

    pub fn bytes_archived(&self) -> u64 {
        self.directories
            .iter()
            .map(|d| d.report.bytes_archived)
            .sum()
    }
}

/// Load `config_path` and archive stale files in every listed directory.
///
/// Any error is reported through [`Notify::failure`] before being returned;
/// the first failure ends the run.
pub fn run<N: Notify + ?Sized>(config_path: &Path, notifier: &N) -> Result<RunSummary> {
    let result = load_and_run(config_path, notifier);
    if let Err(e) = &result {
        notifier.failure(e);
    }
    result
}

fn load_and_run<N: Notify + ?Sized>(config_path: &Path, notifier: &N) -> Result<RunSummary> {
    notifier.notify("Operation is starting...");

    notifier.notify("Binding params...");
    let config = RetentionConfig::load(config_path)?;
    notifier.notify("Params are bound.");

    sweep(&config, SystemTime::now(), notifier)
}

/// Run with an already loaded configuration and an explicit clock.
pub fn run_with_config<N: Notify + ?Sized>(
    config: &RetentionConfig,
    now: SystemTime,
    notifier: &N,
) -> Result<RunSummary> {
    let result = sweep(config, now, notifier);
    if let Err(e) = &result {
        notifier.failure(e);
    }
    result
}

fn sweep<N: Notify + ?Sized>(
    config: &RetentionConfig,
    now: SystemTime,
    notifier: &N,
) -> Result<RunSummary> {
    let start = Instant::now();

    config.validate()?;
    let cutoff = Cutoff::from_threshold_days(now, config.threshold_days)?;
    debug!(
        cutoff = %cutoff,
        threshold_days = config.threshold_days,
        "Computed cutoff"
    );

    let mut directories = Vec::with_capacity(config.directories.len());
    for directory in &config.directories {
        notifier.notify(&format!("Searching in {} directory...", directory.display()));
        let report = archive_and_purge(directory, cutoff, notifier)?;
        directories.push(DirectoryReport {
            directory: directory.clone(),
            report,
        });
    }

    notifier.notify("Operation is completed.");

    let summary = RunSummary {
        cutoff: cutoff.to_string(),
        directories,
        duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        files_archived = summary.files_archived(),
        bytes_archived = summary.bytes_archived(),
        duration_ms = summary.duration_ms,
        "Retention run completed"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SweepError;
    use crate::config::CONFIG_FILE_NAME;
    use crate::notifier::RecordingNotifier;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &Path, directories: &[&Path], threshold_days: i64) -> PathBuf {
        let config = RetentionConfig {
            directories: directories.iter().map(|d| d.to_path_buf()).collect(),
            threshold_days,
        };
        let path = dir.join(CONFIG_FILE_NAME);
        fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_run_archives_each_directory_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("first");
        let second = temp_dir.path().join("second");
        fs::create_dir_all(&first).unwrap();
        fs::create_dir_all(&second).unwrap();
        fs::write(first.join("a.log"), "a").unwrap();
        fs::write(second.join("b.txt"), "b").unwrap();

        // -1 days puts the cutoff a day ahead, so everything is stale.
        let config_path = write_config(temp_dir.path(), &[&first, &second], -1);
        let notifier = RecordingNotifier::default();
        let summary = run(&config_path, &notifier).unwrap();

        assert_eq!(summary.files_archived(), 2);
        assert_eq!(summary.directories[0].directory, first);
        assert_eq!(summary.directories[1].directory, second);
        assert!(first.join("a.log.zip").exists());
        assert!(second.join("b.txt.zip").exists());

        let messages = notifier.messages.borrow();
        assert_eq!(messages.first().unwrap(), "Operation is starting...");
        assert_eq!(messages.last().unwrap(), "Operation is completed.");
        let first_search = messages
            .iter()
            .position(|m| *m == format!("Searching in {} directory...", first.display()))
            .unwrap();
        let second_search = messages
            .iter()
            .position(|m| *m == format!("Searching in {} directory...", second.display()))
            .unwrap();
        assert!(first_search < second_search);
        assert!(notifier.failures.borrow().is_empty());
    }

    #[test]
    fn test_missing_config_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let notifier = RecordingNotifier::default();

        let err = run(&temp_dir.path().join(CONFIG_FILE_NAME), &notifier).unwrap_err();
        assert!(matches!(err, SweepError::ConfigNotFound { .. }));
        assert_eq!(notifier.failures.borrow().len(), 1);
        assert!(
            !notifier
                .messages
                .borrow()
                .contains(&"Params are bound.".to_string())
        );
    }

    #[test]
    fn test_empty_directories_fail_before_scanning() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("stale.log"), "x").unwrap();
        let config = RetentionConfig {
            directories: Vec::new(),
            threshold_days: -1,
        };

        let notifier = RecordingNotifier::default();
        let err = run_with_config(&config, SystemTime::now(), &notifier).unwrap_err();

        assert!(matches!(err, SweepError::NoDirectories { .. }));
        assert!(temp_dir.path().join("stale.log").exists());
        assert!(
            notifier
                .messages
                .borrow()
                .iter()
                .all(|m| !m.starts_with("Searching"))
        );
    }

    #[test]
    fn test_threshold_out_of_range_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let config = RetentionConfig {
            directories: vec![temp_dir.path().to_path_buf()],
            threshold_days: i64::MAX,
        };

        let notifier = RecordingNotifier::default();
        let err = run_with_config(&config, SystemTime::now(), &notifier).unwrap_err();
        assert!(matches!(err, SweepError::ThresholdOutOfRange { .. }));
        assert_eq!(notifier.failures.borrow().len(), 1);
    }

    #[test]
    fn test_explicit_clock_controls_cutoff() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("app.log"), "x").unwrap();
        let config = RetentionConfig {
            directories: vec![temp_dir.path().to_path_buf()],
            threshold_days: 7,
        };

        // A clock a month after the epoch puts the cutoff before every real file.
        let now = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(30 * 86_400);
        let notifier = RecordingNotifier::default();
        let summary = run_with_config(&config, now, &notifier).unwrap();

        assert_eq!(summary.files_archived(), 0);
        assert!(temp_dir.path().join("app.log").exists());
    }
}
