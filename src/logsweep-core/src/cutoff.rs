//! Staleness boundary for a retention run.

use chrono::{DateTime, Utc};
use std::fmt;
use std::time::{Duration, SystemTime};

use crate::config::SECONDS_PER_DAY;
use crate::{Result, SweepError};

/// Point in time separating stale files from fresh ones.
///
/// Computed once per run and compared against every candidate's
/// modification time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cutoff(SystemTime);

impl Cutoff {
    /// `now` minus `threshold_days` whole days.
    ///
    /// A negative threshold yields a cutoff in the future.
    pub fn from_threshold_days(now: SystemTime, threshold_days: i64) -> Result<Self> {
        let out_of_range = || SweepError::ThresholdOutOfRange {
            days: threshold_days.to_string(),
        };

        let offset_secs = threshold_days
            .checked_mul(SECONDS_PER_DAY)
            .ok_or_else(out_of_range)?;
        let offset = Duration::from_secs(offset_secs.unsigned_abs());

        let boundary = if offset_secs >= 0 {
            now.checked_sub(offset)
        } else {
            now.checked_add(offset)
        };

        boundary.map(Self).ok_or_else(out_of_range)
    }

    pub fn at(time: SystemTime) -> Self {
        Self(time)
    }

    pub fn as_system_time(&self) -> SystemTime {
        self.0
    }

    /// A file is stale when it was modified strictly before the cutoff.
    pub fn is_stale(&self, modified: SystemTime) -> bool {
        modified < self.0
    }
}

impl fmt::Display for Cutoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let datetime: DateTime<Utc> = self.0.into();
        write!(f, "{}", datetime.to_rfc3339())
    }
}
