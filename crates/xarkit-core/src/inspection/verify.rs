//! Archive verification implementation.

use std::io::Read;
use std::io::Seek;
use std::path::Path;

use crate::EntryKind;
use crate::Result;
use crate::XarArchive;
use crate::XarError;
use crate::inspection::report::CheckStatus;
use crate::inspection::report::IssueCategory;
use crate::inspection::report::IssueSeverity;
use crate::inspection::report::VerificationIssue;
use crate::inspection::report::VerificationReport;
use crate::inspection::report::determine_status;
use crate::security::symlink_stays_inside;
use crate::security::validate_entry_name;

/// Verifies an archive without extracting it.
///
/// Checks the TOC checksum, then reads every member with data, verifying
/// its archived and extracted checksums and decoding it. Entry names and
/// symlink targets are checked the same way extraction checks them.
///
/// # Errors
///
/// Returns an error only if the archive cannot be opened at all. Problems
/// found inside a readable archive are reported in
/// `VerificationReport::issues`.
///
/// # Examples
///
/// ```no_run
/// use xarkit_core::VerificationStatus;
/// use xarkit_core::verify_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = verify_archive("test-file-sha512.xar")?;
/// if report.status != VerificationStatus::Pass {
///     for issue in &report.issues {
///         eprintln!("[{}] {}", issue.severity, issue.message);
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub fn verify_archive<P: AsRef<Path>>(archive_path: P) -> Result<VerificationReport> {
    let mut archive = XarArchive::open(archive_path)?;
    Ok(verify(&mut archive))
}

/// Verifies an already opened archive.
pub fn verify<R: Read + Seek>(archive: &mut XarArchive<R>) -> VerificationReport {
    let mut issues = Vec::new();

    let (toc_status, toc_algorithm) = match archive.verify_toc_checksum() {
        Ok(Some(algorithm)) => (CheckStatus::Pass, Some(algorithm.name().to_string())),
        Ok(None) => (CheckStatus::Skipped, None),
        Err(e) => {
            log::warn!("table of contents checksum: {e}");
            issues.push(VerificationIssue::from_error(&e, None));
            let style = archive.toc().checksum.as_ref().map(|c| c.style.clone());
            // An algorithm we cannot compute was not checked, not failed.
            let status = if matches!(e, XarError::UnsupportedChecksum(_)) {
                CheckStatus::Skipped
            } else {
                CheckStatus::Fail
            };
            (status, style)
        }
    };

    let toc = archive.toc().clone();
    let members = toc.walk();
    let mut members_checked = 0;
    let mut member_issues = 0;

    for (path, entry) in &members {
        if let Err(e) = validate_entry_name(&entry.name, path) {
            issues.push(VerificationIssue::from_error(&e, Some(path.clone())));
            member_issues += 1;
        }

        if entry.kind == EntryKind::Symlink
            && let Some(target) = &entry.link
            && !symlink_stays_inside(Path::new(path.as_str()), Path::new(target))
        {
            issues.push(VerificationIssue {
                severity: IssueSeverity::High,
                category: IssueCategory::SymlinkEscape,
                entry_path: Some(path.clone()),
                message: format!("symlink target escapes the archive root: {path} -> {target}"),
            });
            member_issues += 1;
        }

        if entry.data.is_some() {
            members_checked += 1;
            if let Err(e) = archive.read_member(entry, u64::MAX) {
                log::warn!("{path}: {e}");
                issues.push(VerificationIssue::from_error(&e, Some(path.clone())));
                member_issues += 1;
            }
        }
    }

    issues.sort_by(|a, b| b.severity.cmp(&a.severity));

    VerificationReport {
        status: determine_status(&issues),
        toc_status,
        toc_algorithm,
        members_status: if member_issues == 0 {
            CheckStatus::Pass
        } else {
            CheckStatus::Fail
        },
        members_checked,
        total_entries: members.len(),
        issues,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::VerificationStatus;
    use crate::formats::ChecksumAlgorithm;
    use crate::test_utils::XarTestBuilder;
    use std::io::Cursor;

    fn verify_bytes(bytes: Vec<u8>) -> VerificationReport {
        verify(&mut XarArchive::from_reader(Cursor::new(bytes)).unwrap())
    }

    #[test]
    fn test_clean_archive_passes() {
        let report = verify_bytes(
            XarTestBuilder::new()
                .toc_checksum(ChecksumAlgorithm::Sha512)
                .file_checksum(ChecksumAlgorithm::Sha256)
                .add_file("test.txt", b"fixture")
                .add_file("d/e.txt", b"nested")
                .build(),
        );
        assert!(report.is_ok());
        assert_eq!(report.toc_status, CheckStatus::Pass);
        assert_eq!(report.toc_algorithm.as_deref(), Some("sha512"));
        assert_eq!(report.members_checked, 2);
        assert_eq!(report.total_entries, 3);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_tampered_member_fails() {
        let report = verify_bytes(
            XarTestBuilder::new()
                .add_file("a.txt", b"fine")
                .add_file("b.txt", b"altered")
                .tamper_heap()
                .build(),
        );
        assert_eq!(report.status, VerificationStatus::Fail);
        assert_eq!(report.toc_status, CheckStatus::Pass);
        assert_eq!(report.members_status, CheckStatus::Fail);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].category, IssueCategory::MemberChecksum);
        assert_eq!(report.issues[0].entry_path.as_deref(), Some("b.txt"));
    }

    #[test]
    fn test_tampered_toc_checksum_fails() {
        let report = verify_bytes(
            XarTestBuilder::new()
                .add_file("a.txt", b"fine")
                .tamper_toc_checksum()
                .build(),
        );
        assert_eq!(report.status, VerificationStatus::Fail);
        assert_eq!(report.toc_status, CheckStatus::Fail);
        assert_eq!(report.members_status, CheckStatus::Pass);
        assert_eq!(report.issues[0].category, IssueCategory::TocChecksum);
    }

    #[test]
    fn test_no_toc_checksum_skipped() {
        let report = verify_bytes(
            XarTestBuilder::new()
                .toc_checksum(ChecksumAlgorithm::None)
                .add_file("a.txt", b"fine")
                .build(),
        );
        assert_eq!(report.toc_status, CheckStatus::Skipped);
        assert!(report.is_ok());
    }

    #[test]
    fn test_hostile_names_reported() {
        let report = verify_bytes(
            XarTestBuilder::new()
                .add_raw_file("..", b"x")
                .add_symlink("link", "../../outside")
                .build(),
        );
        assert_eq!(report.status, VerificationStatus::Fail);
        let categories: Vec<IssueCategory> = report.issues.iter().map(|i| i.category).collect();
        assert!(categories.contains(&IssueCategory::PathTraversal));
        assert!(categories.contains(&IssueCategory::SymlinkEscape));
    }

    #[test]
    fn test_unsupported_toc_checksum_skipped() {
        use crate::formats::XarHeader;
        use crate::formats::header::MIN_HEADER_SIZE;
        use std::io::Write;

        let xml = "<xar><toc><checksum style=\"sha384\"><offset>0</offset><size>48</size></checksum></toc></xar>";
        let mut enc = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        enc.write_all(xml.as_bytes()).unwrap();
        let toc = enc.finish().unwrap();

        let mut bytes = XarHeader {
            size: MIN_HEADER_SIZE,
            version: 1,
            toc_len_compressed: toc.len() as u64,
            toc_len_uncompressed: xml.len() as u64,
            checksum_code: 0,
            checksum_name: None,
        }
        .to_bytes();
        bytes.extend_from_slice(&toc);
        bytes.extend_from_slice(&[0u8; 48]);

        let report = verify_bytes(bytes);
        assert_eq!(report.toc_status, CheckStatus::Skipped);
        assert_eq!(report.toc_algorithm.as_deref(), Some("sha384"));
        assert_eq!(report.status, VerificationStatus::Warning);
        assert_eq!(report.issues[0].category, IssueCategory::Unsupported);
    }
}
