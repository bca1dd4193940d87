//! Stamps `LOGSWEEP_BUILD_INFO` ("<commit> <date>") for `logsweep --version`.
//!
//! The date honours `SOURCE_DATE_EPOCH` so packaged builds are reproducible.

use std::env;
use std::process::Command;

use chrono::{DateTime, Utc};

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn build_date() -> String {
    let date = env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|secs| secs.parse::<i64>().ok())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now);
    date.format("%Y-%m-%d").to_string()
}

fn main() {
    let commit = git(&["describe", "--always", "--dirty", "--abbrev=7"])
        .unwrap_or_else(|| "untracked".to_string());

    println!("cargo:rustc-env=LOGSWEEP_BUILD_INFO={commit} {}", build_date());
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/index");
}
