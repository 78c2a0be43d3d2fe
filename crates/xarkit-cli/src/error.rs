//! Error conversion utilities for CLI.
//!
//! Converts xarkit-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use std::path::Path;
use xarkit_core::XarError;

/// Converts `XarError` to user-friendly anyhow error with context
pub fn convert_archive_error(err: XarError, archive: &Path) -> anyhow::Error {
    match err {
        XarError::PathTraversal { path } => {
            anyhow!(
                "Security violation: Archive '{}' contains an unsafe entry '{}'\n\
                 HINT: This archive may be malicious. Do not extract from untrusted sources.",
                archive.display(),
                path.display()
            )
        }
        XarError::QuotaExceeded { resource } => {
            anyhow!(
                "Extraction limit exceeded for '{}': {}\n\
                 HINT: Use --max-files, --max-total-size, or --max-file-size to increase limits.",
                archive.display(),
                resource
            )
        }
        err @ XarError::ChecksumMismatch { .. } => {
            anyhow!(
                "Integrity check failed for '{}': {}\n\
                 HINT: The archive was modified or damaged. Use --no-verify to extract anyway.",
                archive.display(),
                err
            )
        }
        XarError::NotXar => {
            anyhow!(
                "Not a XAR archive: {}\n\
                 HINT: XAR archives start with the bytes 'xar!'.",
                archive.display()
            )
        }
        err @ (XarError::InvalidHeader(_)
        | XarError::InvalidToc(_)
        | XarError::TocLengthMismatch { .. }
        | XarError::CorruptData(_)) => {
            anyhow!(
                "Invalid archive '{}': {}\n\
                 HINT: The archive may be truncated or corrupted.",
                archive.display(),
                err
            )
        }
        err @ (XarError::UnsupportedChecksum(_) | XarError::UnsupportedEncoding(_)) => {
            anyhow!(
                "Unsupported archive feature in '{}': {}\n\
                 HINT: Supported checksums: sha1, md5, sha256, sha512. \
                 Supported encodings: raw, gzip, bzip2, lzma, xz.",
                archive.display(),
                err
            )
        }
        XarError::Io(io_err) => {
            anyhow!(
                "I/O error while processing '{}': {}",
                archive.display(),
                io_err
            )
        }
        _ => anyhow::Error::from(err)
            .context(format!("Error processing archive '{}'", archive.display())),
    }
}

/// Converts archiver invocation errors, with installation hints.
pub fn convert_archiver_error(err: XarError) -> anyhow::Error {
    match err {
        XarError::ArchiverNotFound(name) => {
            anyhow!(
                "xar archiver not found: {name}\n\
                 HINT: Install xar (macOS ships it) or pass --archiver <PATH>."
            )
        }
        XarError::ArchiverFailed { output, status } => {
            anyhow!(
                "xar failed to create '{}': {status}\n\
                 HINT: Check that the input exists and the archiver supports the requested options.",
                output.display()
            )
        }
        other => anyhow::Error::from(other),
    }
}

/// Adds context to a generic error about archive operations
pub fn add_archive_context<T>(
    result: Result<T, XarError>,
    archive: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_archive_error(e, archive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_convert_path_traversal_error() {
        let err = XarError::PathTraversal {
            path: PathBuf::from(".."),
        };
        let converted = convert_archive_error(err, Path::new("malicious.xar"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("unsafe entry"));
        assert!(msg.contains("malicious.xar"));
        assert!(msg.contains("HINT"));
    }

    #[test]
    fn test_convert_checksum_error() {
        let err = XarError::ChecksumMismatch {
            subject: "test.txt".into(),
            algorithm: "sha1".into(),
            expected: "aa".into(),
            actual: "bb".into(),
        };
        let converted = convert_archive_error(err, Path::new("test.xar"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("Integrity check failed"));
        assert!(msg.contains("test.txt"));
        assert!(msg.contains("--no-verify"));
    }

    #[test]
    fn test_convert_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let converted = convert_archive_error(XarError::Io(io_err), Path::new("test.xar"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("I/O error"));
    }

    #[test]
    fn test_convert_archiver_not_found() {
        let converted = convert_archiver_error(XarError::ArchiverNotFound("xar".into()));
        let msg = format!("{converted:?}");
        assert!(msg.contains("--archiver"));
    }
}
