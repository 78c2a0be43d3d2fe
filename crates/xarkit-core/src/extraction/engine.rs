//! Core extraction engine.
//!
//! Extraction runs in three passes over the depth-first member list:
//!
//! 1. every entry name is validated, so a hostile archive is rejected before
//!    anything is written;
//! 2. directories and files are written in order, symlinks are created after
//!    all regular content, and no write goes through a link already on disk;
//! 3. attributes are restored in reverse order, children before parents, so
//!    directory timestamps survive the writes beneath them.

use std::fs::File;
use std::fs::create_dir_all;
use std::io::BufWriter;
use std::io::Read;
use std::io::Seek;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use crate::EntryKind;
use crate::ExtractConfig;
use crate::ExtractionReport;
use crate::NoopProgress;
use crate::ProgressCallback;
use crate::Result;
use crate::XarArchive;
use crate::XarError;
use crate::extraction::attributes;
use crate::security::QuotaTracker;
use crate::security::symlink_resolves_inside;
use crate::security::symlink_stays_inside;
use crate::security::validate_entry_name;
use crate::security::verify_no_symlink_ancestors;
use crate::toc::XarEntry;

/// Extracts the archive at `archive_path` into `output_dir`.
///
/// `output_dir` is created if it does not exist. Existing files with the
/// same names are overwritten.
///
/// # Errors
///
/// Returns an error if the archive cannot be read, a member fails
/// verification, an entry name is unsafe, a quota is exceeded, or writing
/// fails.
///
/// # Examples
///
/// ```no_run
/// use xarkit_core::ExtractConfig;
/// use xarkit_core::extract_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = extract_archive("test.xar", "/tmp/out", &ExtractConfig::default())?;
/// println!("extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
pub fn extract_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    output_dir: Q,
    config: &ExtractConfig,
) -> Result<ExtractionReport> {
    extract_archive_with_progress(archive_path, output_dir, config, &mut NoopProgress)
}

/// Same as [`extract_archive`], reporting progress to `progress`.
///
/// # Errors
///
/// See [`extract_archive`].
pub fn extract_archive_with_progress<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    output_dir: Q,
    config: &ExtractConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    let mut archive = XarArchive::open(archive_path)?;
    extract_from(&mut archive, output_dir.as_ref(), config, progress)
}

/// Extracts an already opened archive.
///
/// # Errors
///
/// See [`extract_archive`].
pub fn extract_from<R: Read + Seek>(
    archive: &mut XarArchive<R>,
    dest: &Path,
    config: &ExtractConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    let start = Instant::now();
    let mut report = ExtractionReport::new();
    let mut quota = QuotaTracker::new();

    let toc = archive.toc().clone();
    let members = toc.walk();
    for (path, entry) in &members {
        validate_entry_name(&entry.name, path)?;
    }

    create_dir_all(dest)?;
    log::debug!("extracting {} entries to {}", members.len(), dest.display());

    let total = members.len();
    let mut written: Vec<(PathBuf, &XarEntry)> = Vec::with_capacity(total);
    let mut links: Vec<(&str, &XarEntry)> = Vec::new();

    for (index, (path, entry)) in members.iter().enumerate() {
        let rel = Path::new(path.as_str());
        progress.on_entry_start(rel, total, index + 1);
        let target = dest.join(rel);

        match &entry.kind {
            EntryKind::Directory => {
                quota.record(0, config)?;
                verify_no_symlink_ancestors(dest, rel)?;
                create_dir_all(&target)?;
                report.directories_created += 1;
                written.push((target, *entry));
            }
            EntryKind::File => {
                quota.record(entry.size(), config)?;
                let data = if config.verify_checksums {
                    archive.read_member(entry, config.max_file_size)
                } else {
                    archive.read_member_unverified(entry, config.max_file_size)
                }
                .map_err(|e| with_member_path(e, path))?;

                write_file(dest, rel, &data)?;
                let len = data.len() as u64;
                report.files_extracted += 1;
                report.bytes_written = report.bytes_written.saturating_add(len);
                progress.on_bytes_written(len);
                written.push((target, *entry));
            }
            EntryKind::Symlink if config.allow_symlinks => links.push((path.as_str(), *entry)),
            EntryKind::Symlink => {
                report.skip(format!("skipping symlink {path}: symlinks are not allowed"));
            }
            other => {
                report.skip(format!(
                    "skipping {path}: unsupported entry type {}",
                    other.as_str()
                ));
            }
        }

        progress.on_entry_complete(rel);
    }

    for (path, entry) in links {
        if create_symlink(dest, path, entry, &mut report)? {
            quota.record(0, config)?;
            report.symlinks_created += 1;
        }
    }

    for (target, entry) in written.iter().rev() {
        if let Err(e) = attributes::restore(target, entry, config) {
            report.add_warning(format!(
                "could not restore attributes of {}: {e}",
                target.display()
            ));
        }
    }

    progress.on_complete();
    report.duration = start.elapsed();
    log::debug!(
        "extracted {} files, {} directories, {} symlinks ({} bytes) in {:?}",
        report.files_extracted,
        report.directories_created,
        report.symlinks_created,
        report.bytes_written,
        report.duration
    );
    Ok(report)
}

fn write_file(dest: &Path, rel: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = rel.parent() {
        verify_no_symlink_ancestors(dest, parent)?;
        create_dir_all(dest.join(parent))?;
    }
    let target = dest.join(rel);
    remove_existing_link(&target)?;
    let mut writer = BufWriter::with_capacity(64 * 1024, File::create(&target)?);
    writer.write_all(data)?;
    writer.flush()?;
    Ok(())
}

/// Creates one symlink. Returns `false` if it was skipped.
fn create_symlink(
    dest: &Path,
    path: &str,
    entry: &XarEntry,
    report: &mut ExtractionReport,
) -> Result<bool> {
    let Some(link_target) = entry.link.as_deref() else {
        report.skip(format!("skipping symlink {path}: no link target"));
        return Ok(false);
    };

    let rel = Path::new(path);
    if !symlink_stays_inside(rel, Path::new(link_target))
        || !symlink_resolves_inside(dest, rel, Path::new(link_target))
    {
        return Err(XarError::PathTraversal {
            path: PathBuf::from(format!("{path} -> {link_target}")),
        });
    }

    #[cfg(unix)]
    {
        if let Some(parent) = rel.parent() {
            verify_no_symlink_ancestors(dest, parent)?;
            create_dir_all(dest.join(parent))?;
        }
        let link_path = dest.join(rel);
        remove_existing_link(&link_path)?;
        std::os::unix::fs::symlink(link_target, &link_path)?;
        Ok(true)
    }

    #[cfg(not(unix))]
    {
        let _ = dest;
        report.skip(format!(
            "skipping symlink {path}: symlinks are not supported on this platform"
        ));
        Ok(false)
    }
}

/// Removes a symlink left at `path` by an earlier extraction.
fn remove_existing_link(path: &Path) -> Result<()> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            std::fs::remove_file(path)?;
            Ok(())
        }
        _ => Ok(()),
    }
}

fn with_member_path(err: XarError, path: &str) -> XarError {
    match err {
        XarError::ChecksumMismatch {
            algorithm,
            expected,
            actual,
            ..
        } => XarError::ChecksumMismatch {
            subject: path.to_string(),
            algorithm,
            expected,
            actual,
        },
        other => other,
    }
}
