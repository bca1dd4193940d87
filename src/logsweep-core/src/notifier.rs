//! Notification sink shared by every stage of a run.
//!
//! Messages go to two places: a timestamped line in `logs.log` and the same
//! text on stdout. The log file is owned by an explicit [`Notifier`] handle
//! instead of a process-global subscriber; wrap work in
//! [`Notifier::in_scope`] to route internal diagnostics into the same file.

use std::error::Error as _;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use tracing::{Dispatch, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;

use crate::config::LOG_FILE_NAME;
use crate::{Result, SweepError};

/// Receiver of progress messages and fatal errors.
pub trait Notify {
    /// Record a progress message.
    fn notify(&self, message: &str);

    /// Record an error with enough detail for a postmortem.
    fn failure(&self, error: &SweepError);
}

/// Logging handle writing to `logs.log` and the console.
///
/// Created once at startup by [`prepare_logging`]. Dropping it (or calling
/// [`Notifier::close`]) flushes pending lines to disk.
pub struct Notifier {
    dispatch: Dispatch,
    log_path: PathBuf,
    _guard: WorkerGuard,
}

/// Open the log sink and build the notifier.
///
/// The file lives in `log_dir` when given, else next to the running
/// executable, else in the current working directory. It is opened in
/// append mode and captures every level down to `trace`.
pub fn prepare_logging(log_dir: Option<&Path>) -> Result<Notifier> {
    let log_path = resolve_log_path(log_dir);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|source| SweepError::LogSetup {
            path: log_path.clone(),
            source,
        })?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false);

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::new("trace"))
        .with(file_layer);

    Ok(Notifier {
        dispatch: Dispatch::new(subscriber),
        log_path,
        _guard: guard,
    })
}

/// Where `logs.log` goes for the given (optional) directory.
pub fn resolve_log_path(log_dir: Option<&Path>) -> PathBuf {
    let dir = log_dir
        .filter(|d| !d.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .or_else(executable_dir);

    match dir {
        Some(dir) => dir.join(LOG_FILE_NAME),
        None => PathBuf::from(LOG_FILE_NAME),
    }
}

fn executable_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    exe.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

impl Notifier {
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Run `f` with this notifier's log file as the default tracing sink.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Flush and close the log file.
    pub fn close(self) {
        drop(self);
    }
}

impl Notify for Notifier {
    fn notify(&self, message: &str) {
        self.in_scope(|| info!("{message}"));
        println!("{message}");
    }

    fn failure(&self, err: &SweepError) {
        let chain = error_chain(err);
        self.in_scope(|| error!(error = %chain, details = ?err, "Operation failed"));
    }
}

/// Render an error and all of its sources on one line.
fn error_chain(err: &SweepError) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        // thiserror messages often embed their source already.
        if !rendered.contains(&cause_text) {
            rendered.push_str(": ");
            rendered.push_str(&cause_text);
        }
        source = cause.source();
    }
    rendered
}

/// Notifier that keeps messages in memory.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    pub messages: std::cell::RefCell<Vec<String>>,
    pub failures: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl Notify for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }

    fn failure(&self, error: &SweepError) {
        self.failures.borrow_mut().push(error_chain(error));
    }
}
