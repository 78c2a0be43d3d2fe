//! Error types for XAR archive operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `XarError`.
pub type Result<T> = std::result::Result<T, XarError>;

/// Represents a specific quota resource that was exceeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaResource {
    /// File count quota exceeded.
    FileCount {
        /// Current file count.
        current: usize,
        /// Maximum allowed file count.
        max: usize,
    },
    /// Total size quota exceeded.
    TotalSize {
        /// Current total size in bytes.
        current: u64,
        /// Maximum allowed total size in bytes.
        max: u64,
    },
    /// Single file size quota exceeded.
    FileSize {
        /// File size in bytes.
        size: u64,
        /// Maximum allowed file size in bytes.
        max: u64,
    },
    /// Integer overflow detected in quota tracking.
    IntegerOverflow,
}

impl std::fmt::Display for QuotaResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileCount { current, max } => {
                write!(f, "quota exceeded: file count ({current} > {max})")
            }
            Self::TotalSize { current, max } => {
                write!(f, "quota exceeded: total size ({current} > {max})")
            }
            Self::FileSize { size, max } => {
                write!(f, "quota exceeded: single file size ({size} > {max})")
            }
            Self::IntegerOverflow => {
                write!(f, "quota exceeded: integer overflow in quota tracking")
            }
        }
    }
}

/// Errors that can occur while reading, verifying or producing XAR archives.
#[derive(Error, Debug)]
pub enum XarError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file does not start with the `xar!` magic.
    #[error("not a XAR archive")]
    NotXar,

    /// The fixed-size header is truncated or inconsistent.
    #[error("invalid XAR header: {0}")]
    InvalidHeader(String),

    /// The table of contents could not be inflated or parsed.
    #[error("invalid table of contents: {0}")]
    InvalidToc(String),

    /// The inflated table of contents does not match the header.
    #[error("table of contents length mismatch: header says {expected} bytes, got {actual}")]
    TocLengthMismatch {
        /// Uncompressed length declared in the header.
        expected: u64,
        /// Actual inflated length.
        actual: u64,
    },

    /// Member data could not be decoded.
    #[error("corrupt member data: {0}")]
    CorruptData(String),

    /// A stored checksum does not match the computed digest.
    #[error("{subject} checksum mismatch ({algorithm}): expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// What was checksummed (`table of contents` or a member path).
        subject: String,
        /// Checksum algorithm name.
        algorithm: String,
        /// Digest recorded in the archive.
        expected: String,
        /// Digest computed from the data.
        actual: String,
    },

    /// Checksum style is not one this library can compute.
    #[error("unsupported checksum algorithm: {0}")]
    UnsupportedChecksum(String),

    /// Data encoding style is not one this library can decode.
    #[error("unsupported data encoding: {0}")]
    UnsupportedEncoding(String),

    /// No member exists at the requested path.
    #[error("member not found: {0}")]
    MemberNotFound(String),

    /// A member name would escape the extraction directory.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending entry path.
        path: PathBuf,
    },

    /// Extraction quota exceeded.
    #[error("{resource}")]
    QuotaExceeded {
        /// Description of the exceeded resource.
        resource: QuotaResource,
    },

    /// The external archiver could not be located.
    #[error("archiver not found: {0}")]
    ArchiverNotFound(String),

    /// The external archiver exited unsuccessfully.
    #[error("archiver failed for {output}: {status}")]
    ArchiverFailed {
        /// Archive the invocation was supposed to produce.
        output: PathBuf,
        /// Exit status description.
        status: String,
    },

    /// Configuration values are inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl XarError {
    /// Returns `true` if this error means the archive content cannot be
    /// trusted: a checksum mismatch or structural corruption.
    ///
    /// # Examples
    ///
    /// ```
    /// use xarkit_core::XarError;
    ///
    /// assert!(XarError::NotXar.is_integrity_failure());
    /// assert!(!XarError::MemberNotFound("a".into()).is_integrity_failure());
    /// ```
    #[must_use]
    pub const fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            Self::NotXar
                | Self::InvalidHeader(_)
                | Self::InvalidToc(_)
                | Self::TocLengthMismatch { .. }
                | Self::CorruptData(_)
                | Self::ChecksumMismatch { .. }
        )
    }

    /// Returns `true` if this error was raised by an extraction safety check.
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(self, Self::PathTraversal { .. } | Self::QuotaExceeded { .. })
    }

    /// Returns a context string for this error, if available.
    ///
    /// # Examples
    ///
    /// ```
    /// use xarkit_core::XarError;
    ///
    /// let err = XarError::InvalidHeader("short read".to_string());
    /// assert_eq!(err.context(), Some("short read"));
    ///
    /// assert_eq!(XarError::NotXar.context(), None);
    /// ```
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::InvalidHeader(msg)
            | Self::InvalidToc(msg)
            | Self::CorruptData(msg)
            | Self::InvalidConfig(msg)
            | Self::ArchiverNotFound(msg) => Some(msg),
            _ => None,
        }
    }

    /// Returns the quota resource that was exceeded, if applicable.
    #[must_use]
    pub const fn quota_resource(&self) -> Option<&QuotaResource> {
        match self {
            Self::QuotaExceeded { resource } => Some(resource),
            _ => None,
        }
    }
}
