//! Summary of the checksum and encoding choices stored in an archive.
//!
//! This is what tells the fixture archives apart: `test-toc-sha256.xar`
//! differs from `test.xar` only in its TOC checksum, `test-file-sha512.xar`
//! only in its per-file checksums, `test-compress-bzip2.xar` only in its
//! data encoding.

use std::collections::BTreeSet;
use std::io::Read;
use std::io::Seek;
use std::path::Path;

use chrono::DateTime;
use chrono::Utc;

use crate::Result;
use crate::XarArchive;

/// Checksum and encoding summary of one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveInspection {
    /// Format version from the header.
    pub version: u16,
    /// Declared header size.
    pub header_size: u16,
    /// TOC checksum algorithm announced by the header (`sha1`, `sha256`,
    /// ...), or `unknown (N)` for unrecognised codes.
    pub header_checksum: String,
    /// `style` of the TOC `<checksum>` element.
    pub toc_checksum: Option<String>,
    /// Compressed TOC length.
    pub toc_compressed_size: u64,
    /// Inflated TOC length.
    pub toc_uncompressed_size: u64,
    /// Archive creation time.
    pub creation_time: Option<DateTime<Utc>>,
    /// Distinct `archived-checksum` styles over all members.
    pub archived_checksums: BTreeSet<String>,
    /// Distinct `extracted-checksum` styles over all members.
    pub extracted_checksums: BTreeSet<String>,
    /// Distinct data encodings over all members.
    pub encodings: BTreeSet<String>,
    /// Number of entries of any kind.
    pub member_count: usize,
    /// Number of regular files.
    pub file_count: usize,
    /// Whether the TOC carries a signature.
    pub signed: bool,
}

impl ArchiveInspection {
    /// Returns the single per-file checksum style if every member agrees.
    #[must_use]
    pub fn file_checksum(&self) -> Option<&str> {
        match (
            self.archived_checksums.len(),
            self.archived_checksums.iter().next(),
        ) {
            (1, Some(style)) => Some(style.as_str()),
            _ => None,
        }
    }

    /// Returns `true` if any member uses `style` (e.g. `application/x-bzip2`).
    #[must_use]
    pub fn uses_encoding(&self, style: &str) -> bool {
        self.encodings.contains(style)
    }
}

/// Inspects the archive at `archive_path`.
///
/// Only the header and table of contents are read.
///
/// # Errors
///
/// Returns an error if the archive cannot be opened or is malformed.
pub fn inspect_archive<P: AsRef<Path>>(archive_path: P) -> Result<ArchiveInspection> {
    let archive = XarArchive::open(archive_path)?;
    Ok(inspect(&archive))
}

/// Inspects an already opened archive.
#[must_use]
pub fn inspect<R: Read + Seek>(archive: &XarArchive<R>) -> ArchiveInspection {
    let header = archive.header();
    let toc = archive.toc();

    let header_checksum = header.checksum_algorithm().map_or_else(
        |_| match &header.checksum_name {
            Some(name) => name.clone(),
            None => format!("unknown ({})", header.checksum_code),
        },
        |alg| alg.name().to_string(),
    );

    let mut inspection = ArchiveInspection {
        version: header.version,
        header_size: header.size,
        header_checksum,
        toc_checksum: toc.checksum.as_ref().map(|c| c.style.clone()),
        toc_compressed_size: header.toc_len_compressed,
        toc_uncompressed_size: header.toc_len_uncompressed,
        creation_time: toc.creation_time,
        archived_checksums: BTreeSet::new(),
        extracted_checksums: BTreeSet::new(),
        encodings: BTreeSet::new(),
        member_count: 0,
        file_count: 0,
        signed: toc.is_signed(),
    };

    for (_, entry) in toc.walk() {
        inspection.member_count += 1;
        if entry.is_file() {
            inspection.file_count += 1;
        }
        let Some(data) = &entry.data else {
            continue;
        };
        inspection
            .encodings
            .insert(data.encoding.style().to_string());
        if let Some(cksum) = &data.archived_checksum {
            inspection
                .archived_checksums
                .insert(cksum.style.to_ascii_lowercase());
        }
        if let Some(cksum) = &data.extracted_checksum {
            inspection
                .extracted_checksums
                .insert(cksum.style.to_ascii_lowercase());
        }
    }

    inspection
}
