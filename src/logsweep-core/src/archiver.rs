//! Archive-and-purge pass over one directory tree.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::config::{ARCHIVE_SUFFIX, TEMP_SUFFIX};
use crate::cutoff::Cutoff;
use crate::notifier::Notify;
use crate::selection::is_candidate;
use crate::{Result, SweepError};

/// A stale file picked up during the walk.
#[derive(Debug)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
}

/// Result of archiving one directory tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Archives created (and originals deleted).
    pub files_archived: usize,
    /// Uncompressed size of the archived originals.
    pub bytes_archived: u64,
    /// Paths of the archives written, in processing order.
    pub archives: Vec<PathBuf>,
}

/// Archive every stale log/text file under `root` and delete the originals.
///
/// For each file modified strictly before `cutoff`:
/// 1. Write `<name>.zip` next to it with a single deflate entry `<name>`
/// 2. Notify `"<path> zipped."`
/// 3. Delete the original and notify `"<path> deleted."`
///
/// The first IO or archive error aborts the pass. Files handled before the
/// error stay archived.
pub fn archive_and_purge<N: Notify + ?Sized>(
    root: &Path,
    cutoff: Cutoff,
    notifier: &N,
) -> Result<ArchiveReport> {
    let mut report = ArchiveReport::default();

    // Only files below the root are candidates, never the root itself.
    if !root.is_dir() {
        warn!(root = %root.display(), "Not a directory, nothing to archive");
        return Ok(report);
    }

    let stale = collect_stale(root, cutoff)?;
    debug!(
        root = %root.display(),
        stale = stale.len(),
        cutoff = %cutoff,
        "Collected stale files"
    );

    for file in &stale {
        let archive_path = write_archive(&file.path, file.size)?;
        notifier.notify(&format!("{} zipped.", file.path.display()));

        fs::remove_file(&file.path).map_err(|e| SweepError::io(&file.path, e))?;
        notifier.notify(&format!("{} deleted.", file.path.display()));

        report.files_archived += 1;
        report.bytes_archived += file.size;
        report.archives.push(archive_path);
    }

    if report.files_archived > 0 {
        info!(
            root = %root.display(),
            files_archived = report.files_archived,
            bytes_archived = report.bytes_archived,
            "Archiving completed"
        );
    }

    Ok(report)
}

/// Walk `root` and return candidates modified before `cutoff`.
///
/// Unreadable directories are skipped; metadata errors on a candidate abort.
/// Symlinks to files are candidates like regular files: their target's
/// metadata decides staleness and the link itself is what gets removed.
fn collect_stale(root: &Path, cutoff: Cutoff) -> Result<Vec<CandidateFile>> {
    let mut stale = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        if !is_candidate(&entry.file_name().to_string_lossy()) {
            continue;
        }

        // Follows symlinks; dangling links and links to directories fall out here.
        let metadata = match fs::metadata(entry.path()) {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => continue,
            Err(e) if entry.path_is_symlink() && e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %entry.path().display(), "Skipping dangling symlink");
                continue;
            }
            Err(e) => return Err(SweepError::io(entry.path(), e)),
        };
        let modified = metadata
            .modified()
            .map_err(|e| SweepError::io(entry.path(), e))?;

        if cutoff.is_stale(modified) {
            stale.push(CandidateFile {
                path: entry.into_path(),
                size: metadata.len(),
                modified,
            });
        }
    }

    Ok(stale)
}

/// Append `suffix` to the full file name of `path`.
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Write the single-entry archive for `source` and return its path.
///
/// The archive is built under a temporary name, synced, then renamed into
/// place, so `<name>.zip` only ever exists complete. On failure the
/// temporary file is removed and the original is left untouched.
fn write_archive(source: &Path, size: u64) -> Result<PathBuf> {
    let entry_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            SweepError::io(
                source,
                io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
            )
        })?;

    let archive_path = with_suffix(source, ARCHIVE_SUFFIX);
    let temp_path = with_suffix(&archive_path, TEMP_SUFFIX);

    let written = write_zip(source, &temp_path, &entry_name, size).and_then(|()| {
        fs::rename(&temp_path, &archive_path).map_err(|e| SweepError::io(&archive_path, e))
    });

    if let Err(e) = written {
        if let Err(cleanup) = fs::remove_file(&temp_path) {
            if cleanup.kind() != io::ErrorKind::NotFound {
                warn!(
                    path = %temp_path.display(),
                    error = %cleanup,
                    "Failed to remove partial archive"
                );
            }
        }
        return Err(e);
    }

    debug!(
        source = %source.display(),
        archive = %archive_path.display(),
        "Archive written"
    );
    Ok(archive_path)
}

/// Entries of this size or larger need ZIP64 headers.
fn needs_zip64(size: u64) -> bool {
    size >= u64::from(u32::MAX)
}

fn write_zip(source: &Path, dest: &Path, entry_name: &str, size: u64) -> Result<()> {
    let archive_err = |e: zip::result::ZipError| SweepError::Archive {
        path: dest.to_path_buf(),
        source: e,
    };

    let mut input = File::open(source).map_err(|e| SweepError::io(source, e))?;
    let output = File::create(dest).map_err(|e| SweepError::io(dest, e))?;

    let mut zip = ZipWriter::new(BufWriter::new(output));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(needs_zip64(size));

    zip.start_file(entry_name, options).map_err(archive_err)?;
    io::copy(&mut input, &mut zip).map_err(|e| SweepError::io(source, e))?;

    let writer = zip.finish().map_err(archive_err)?;
    let file = writer
        .into_inner()
        .map_err(|e| SweepError::io(dest, e.into_error()))?;
    file.sync_all().map_err(|e| SweepError::io(dest, e))?;

    Ok(())
}
