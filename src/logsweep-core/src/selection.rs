//! Candidate file selection.

use regex::Regex;
use std::sync::LazyLock;

/// Log or text file name, optionally followed by a rotation number
/// (`app.log`, `notes.txt`, `service.log.3`).
static CANDIDATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\.log|\.txt)(\.\d+)?$").expect("Invalid candidate regex"));

/// Check whether a file's base name makes it eligible for archiving.
///
/// Case-sensitive; archives (`.zip`) never match.
pub fn is_candidate(file_name: &str) -> bool {
    CANDIDATE_REGEX.is_match(file_name)
}
