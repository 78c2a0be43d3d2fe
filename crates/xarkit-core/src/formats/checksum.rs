//! Checksum algorithms used by XAR archives.
//!
//! A XAR archive carries two kinds of checksums: one over the compressed
//! table of contents (its algorithm is announced in the header and repeated in
//! the TOC) and per-file `archived-checksum` / `extracted-checksum` values over
//! the stored and decoded member data.

use std::fmt;
use std::fmt::Write;
use std::str::FromStr;

use md5::Md5;
use sha1::Sha1;
use sha2::Digest;
use sha2::Sha256;
use sha2::Sha512;

use crate::Result;
use crate::XarError;

/// Checksum algorithm for TOC or member data.
///
/// # Examples
///
/// ```
/// use xarkit_core::formats::checksum::ChecksumAlgorithm;
///
/// let alg: ChecksumAlgorithm = "SHA256".parse().unwrap();
/// assert_eq!(alg, ChecksumAlgorithm::Sha256);
/// assert_eq!(alg.digest_len(), 32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChecksumAlgorithm {
    /// No checksum recorded.
    None,
    /// SHA-1, the archiver's historical default.
    Sha1,
    /// MD5.
    Md5,
    /// SHA-256.
    Sha256,
    /// SHA-512.
    Sha512,
}

impl ChecksumAlgorithm {
    /// Returns the name used in TOC `style` attributes and archiver flags.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Sha1 => "sha1",
            Self::Md5 => "md5",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    /// Returns the raw digest length in bytes (zero for `None`).
    #[must_use]
    pub const fn digest_len(self) -> usize {
        match self {
            Self::None => 0,
            Self::Sha1 => 20,
            Self::Md5 => 16,
            Self::Sha256 => 32,
            Self::Sha512 => 64,
        }
    }

    /// Maps the numeric header field to an algorithm.
    ///
    /// Value 3 means "other": the real algorithm is named in the extended
    /// header, so `None` is returned here and the caller must look it up.
    #[must_use]
    pub const fn from_header_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::Sha1),
            2 => Some(Self::Md5),
            _ => None,
        }
    }

    /// Computes the raw digest of `data`.
    #[must_use]
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::None => Vec::new(),
            Self::Sha1 => Sha1::digest(data).to_vec(),
            Self::Md5 => Md5::digest(data).to_vec(),
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Sha512 => Sha512::digest(data).to_vec(),
        }
    }

    /// Computes the lowercase hex digest of `data`.
    #[must_use]
    pub fn hex_digest(self, data: &[u8]) -> String {
        to_hex(&self.digest(data))
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = XarError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "sha1" | "sha-1" => Ok(Self::Sha1),
            "md5" => Ok(Self::Md5),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "sha512" | "sha-512" => Ok(Self::Sha512),
            _ => Err(XarError::UnsupportedChecksum(s.to_string())),
        }
    }
}

/// Encodes bytes as lowercase hex.
#[must_use]
pub fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
            let _ = write!(out, "{b:02x}");
            out
        })
}

/// Checks `data` against a hex digest recorded in the archive.
///
/// Comparison is case-insensitive since some archivers write uppercase hex.
///
/// # Errors
///
/// Returns `XarError::ChecksumMismatch` naming `subject` when the digest
/// differs.
pub fn verify_hex(
    algorithm: ChecksumAlgorithm,
    data: &[u8],
    expected: &str,
    subject: &str,
) -> Result<()> {
    if algorithm == ChecksumAlgorithm::None {
        return Ok(());
    }

    let actual = algorithm.hex_digest(data);
    if actual.eq_ignore_ascii_case(expected.trim()) {
        Ok(())
    } else {
        Err(XarError::ChecksumMismatch {
            subject: subject.to_string(),
            algorithm: algorithm.name().to_string(),
            expected: expected.trim().to_ascii_lowercase(),
            actual,
        })
    }
}
