//! Archive manifest types.

use chrono::DateTime;
use chrono::Utc;

use crate::EntryKind;
use crate::formats::Encoding;
use crate::toc::XarEntry;

/// One listed member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Member path, `/`-joined.
    pub path: String,
    /// Entry kind.
    pub kind: EntryKind,
    /// Decoded size in bytes.
    pub size: u64,
    /// Stored size in the heap.
    pub stored_size: u64,
    /// Permission bits.
    pub mode: Option<u32>,
    /// Modification time.
    pub mtime: Option<DateTime<Utc>>,
    /// Owner user name.
    pub user: Option<String>,
    /// Owner group name.
    pub group: Option<String>,
    /// Data encoding, for members with data.
    pub encoding: Option<Encoding>,
    /// Symlink target.
    pub link_target: Option<String>,
}

impl ManifestEntry {
    /// Builds a manifest entry from a TOC entry and its path.
    #[must_use]
    pub fn from_entry(path: String, entry: &XarEntry) -> Self {
        Self {
            path,
            kind: entry.kind.clone(),
            size: entry.size(),
            stored_size: entry.stored_size(),
            mode: entry.mode,
            mtime: entry.mtime,
            user: entry.user.clone(),
            group: entry.group.clone(),
            encoding: entry.encoding().cloned(),
            link_target: entry.link.clone(),
        }
    }
}

/// Listing of an archive's members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveManifest {
    /// Entries in depth-first order.
    pub entries: Vec<ManifestEntry>,
    /// Number of entries.
    pub total_entries: usize,
    /// Sum of decoded sizes.
    pub total_size: u64,
    /// Sum of stored sizes.
    pub total_stored_size: u64,
}

impl ArchiveManifest {
    /// Creates an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry and updates the totals.
    pub fn add_entry(&mut self, entry: ManifestEntry) {
        self.total_entries += 1;
        self.total_size = self.total_size.saturating_add(entry.size);
        self.total_stored_size = self.total_stored_size.saturating_add(entry.stored_size);
        self.entries.push(entry);
    }
}
