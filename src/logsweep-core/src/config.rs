//! Retention configuration and loading.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{Result, SweepError};

// ============================================================================
// Constants
// ============================================================================

/// Default configuration file, resolved against the working directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Key holding the list of directories to scan.
pub const DIRS_KEY: &str = "DirsToSearch";

/// Key holding the archive threshold in days.
pub const THRESHOLD_KEY: &str = "ArchiveThresholdDays";

/// File name of the notification log.
pub const LOG_FILE_NAME: &str = "logs.log";

/// Suffix appended to the full name of an archived file.
pub const ARCHIVE_SUFFIX: &str = ".zip";

/// Suffix for archives that are still being written.
pub const TEMP_SUFFIX: &str = ".tmp";

pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

// ============================================================================
// Configuration
// ============================================================================

/// Parameters of a retention run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Directories to scan, in processing order.
    #[serde(rename = "DirsToSearch")]
    pub directories: Vec<PathBuf>,

    /// Files last modified more than this many days ago are archived.
    /// Negative values move the cutoff into the future.
    #[serde(rename = "ArchiveThresholdDays")]
    pub threshold_days: i64,
}

impl RetentionConfig {
    /// Load the configuration from a JSON file.
    ///
    /// No defaults are substituted: a missing file, a missing key or a value
    /// of the wrong type is always an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SweepError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| SweepError::io(path, e))?;
        let config = Self::from_json_str(&content)?;

        debug!(
            path = %path.display(),
            directories = config.directories.len(),
            threshold_days = config.threshold_days,
            "Loaded retention config"
        );
        Ok(config)
    }

    /// Parse and type-check a configuration document.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(content)?;
        let fields = document.as_object().ok_or(SweepError::TypeMismatch {
            field: "configuration",
            expected: "a JSON object",
        })?;

        // Both keys must be present before either is type-checked.
        let (Some(dirs), Some(threshold)) = (fields.get(DIRS_KEY), fields.get(THRESHOLD_KEY))
        else {
            let field = if fields.contains_key(DIRS_KEY) {
                THRESHOLD_KEY
            } else {
                DIRS_KEY
            };
            return Err(SweepError::MissingField { field });
        };

        Ok(Self {
            directories: parse_directories(dirs)?,
            threshold_days: parse_threshold(threshold)?,
        })
    }

    /// Check the loaded values before any directory is touched.
    pub fn validate(&self) -> Result<()> {
        if self.directories.is_empty() {
            return Err(SweepError::NoDirectories { field: DIRS_KEY });
        }
        Ok(())
    }
}

fn parse_directories(value: &Value) -> Result<Vec<PathBuf>> {
    let entries = value.as_array().ok_or(SweepError::TypeMismatch {
        field: DIRS_KEY,
        expected: "a list",
    })?;

    entries
        .iter()
        .map(|entry| {
            entry
                .as_str()
                .map(PathBuf::from)
                .ok_or(SweepError::TypeMismatch {
                    field: DIRS_KEY,
                    expected: "a list of strings",
                })
        })
        .collect()
}

/// Integers past `i64` are out of range rather than mistyped. serde_json
/// stores literals beyond `u64` as floats, so integral floats with an `i64`
/// overflowing magnitude count as such integers.
fn parse_threshold(value: &Value) -> Result<i64> {
    let mismatch = SweepError::TypeMismatch {
        field: THRESHOLD_KEY,
        expected: "an integer",
    };
    let Value::Number(number) = value else {
        return Err(mismatch);
    };
    if let Some(days) = number.as_i64() {
        return Ok(days);
    }

    let beyond_i64 = number.is_u64()
        || number
            .as_f64()
            .is_some_and(|f| f.is_finite() && f.fract() == 0.0 && f.abs() >= I64_BOUND);
    if beyond_i64 {
        Err(SweepError::ThresholdOutOfRange {
            days: number.to_string(),
        })
    } else {
        Err(mismatch)
    }
}

/// 2^63 as a float, the first magnitude `i64` cannot hold.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
