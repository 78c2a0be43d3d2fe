//! Verification report types.

use std::fmt;

use crate::XarError;

/// Overall verification outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStatus {
    /// Every check passed.
    Pass,
    /// Only non-fatal issues, e.g. members using an unsupported encoding.
    Warning,
    /// At least one critical or high severity issue.
    Fail,
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Warning => write!(f, "WARNING"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed.
    Pass,
    /// Check found problems.
    Fail,
    /// Nothing to check, e.g. an archive without a TOC checksum.
    Skipped,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Fail => write!(f, "fail"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// Issue severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IssueSeverity {
    /// Cannot be checked, not necessarily wrong.
    Medium,
    /// Data is damaged.
    High,
    /// Data was altered or is hostile.
    Critical,
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Kind of problem found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueCategory {
    /// TOC checksum does not match.
    TocChecksum,
    /// Member archived or extracted checksum does not match.
    MemberChecksum,
    /// Member data is truncated or cannot be decoded.
    CorruptData,
    /// Entry name would escape the extraction directory.
    PathTraversal,
    /// Symlink target points outside the archive root.
    SymlinkEscape,
    /// Checksum or encoding this library cannot compute.
    Unsupported,
    /// Anything else, e.g. an I/O error while reading.
    Other,
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TocChecksum => "toc-checksum",
            Self::MemberChecksum => "member-checksum",
            Self::CorruptData => "corrupt-data",
            Self::PathTraversal => "path-traversal",
            Self::SymlinkEscape => "symlink-escape",
            Self::Unsupported => "unsupported",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// A single verification finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationIssue {
    /// Severity.
    pub severity: IssueSeverity,
    /// Category.
    pub category: IssueCategory,
    /// Member the issue concerns, `None` for archive-level issues.
    pub entry_path: Option<String>,
    /// Human-readable description.
    pub message: String,
}

impl VerificationIssue {
    /// Classifies a library error as an issue.
    #[must_use]
    pub fn from_error(err: &XarError, entry_path: Option<String>) -> Self {
        let (severity, category) = match err {
            XarError::ChecksumMismatch { .. } if entry_path.is_none() => {
                (IssueSeverity::Critical, IssueCategory::TocChecksum)
            }
            XarError::ChecksumMismatch { .. } => {
                (IssueSeverity::Critical, IssueCategory::MemberChecksum)
            }
            XarError::PathTraversal { .. } => {
                (IssueSeverity::Critical, IssueCategory::PathTraversal)
            }
            XarError::CorruptData(_) => (IssueSeverity::High, IssueCategory::CorruptData),
            XarError::UnsupportedChecksum(_) | XarError::UnsupportedEncoding(_) => {
                (IssueSeverity::Medium, IssueCategory::Unsupported)
            }
            _ => (IssueSeverity::High, IssueCategory::Other),
        };
        Self {
            severity,
            category,
            entry_path,
            message: err.to_string(),
        }
    }
}

/// Result of verifying an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    /// Overall status.
    pub status: VerificationStatus,
    /// TOC checksum check.
    pub toc_status: CheckStatus,
    /// Algorithm the TOC checksum was verified with.
    pub toc_algorithm: Option<String>,
    /// Member data check.
    pub members_status: CheckStatus,
    /// Number of members whose data was read and verified.
    pub members_checked: usize,
    /// Total number of entries.
    pub total_entries: usize,
    /// Findings, most severe first.
    pub issues: Vec<VerificationIssue>,
}

impl VerificationReport {
    /// Returns `true` when verification passed without issues.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == VerificationStatus::Pass
    }
}

pub(crate) fn determine_status(issues: &[VerificationIssue]) -> VerificationStatus {
    match issues.iter().map(|i| i.severity).max() {
        None => VerificationStatus::Pass,
        Some(IssueSeverity::Medium) => VerificationStatus::Warning,
        Some(IssueSeverity::High | IssueSeverity::Critical) => VerificationStatus::Fail,
    }
}
