//! Log retention engine for logsweep.
//!
//! Finds log and text files older than a configured age, compresses each
//! into its own zip archive next to the original and removes the original.
//!
//! # Features
//!
//! - **Parameter loading**: strict JSON configuration with two fields
//! - **Candidate selection**: pure name predicate, rotated logs included
//! - **Archive and purge**: per-file deflate archives written atomically
//! - **Notifications**: explicit logging handle writing to a file and stdout
//!
//! # Example
//!
//! ```rust,no_run
//! use logsweep_core::{prepare_logging, run};
//! use std::path::Path;
//!
//! let notifier = prepare_logging(None).expect("log sink");
//! let summary = notifier
//!     .in_scope(|| run(Path::new("config.json"), &notifier))
//!     .expect("retention run failed");
//! println!("Archived {} files", summary.files_archived());
//! ```

pub mod archiver;
pub mod config;
pub mod cutoff;
pub mod notifier;
pub mod orchestrator;
pub mod selection;

pub use archiver::{ArchiveReport, CandidateFile, archive_and_purge};
pub use config::{
    ARCHIVE_SUFFIX, CONFIG_FILE_NAME, DIRS_KEY, LOG_FILE_NAME, RetentionConfig, SECONDS_PER_DAY,
    TEMP_SUFFIX, THRESHOLD_KEY,
};
pub use cutoff::Cutoff;
pub use notifier::{Notifier, Notify, prepare_logging, resolve_log_path};
pub use orchestrator::{DirectoryReport, RunSummary, run, run_with_config};
pub use selection::is_candidate;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Configuration file {} not found", .path.display())]
    ConfigNotFound { path: PathBuf },
    #[error("Configuration is not valid JSON: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("{field} not found in configuration")]
    MissingField { field: &'static str },
    #[error("{field} must be {expected}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
    },
    #[error("{field} is set but lists no directories")]
    NoDirectories { field: &'static str },
    #[error("Threshold of {days} days is out of range")]
    ThresholdOutOfRange { days: String },
    #[error("Failed to open log file {}: {source}", .path.display())]
    LogSetup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write archive {}: {source}", .path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

impl SweepError {
    /// Wrap an IO error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error was raised before any directory was scanned.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. }
                | Self::ConfigParse(_)
                | Self::MissingField { .. }
                | Self::TypeMismatch { .. }
                | Self::NoDirectories { .. }
                | Self::ThresholdOutOfRange { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SweepError>;
