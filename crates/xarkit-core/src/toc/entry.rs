//! Member entries of the table of contents.

use chrono::DateTime;
use chrono::Utc;

use crate::Result;
use crate::formats::ChecksumAlgorithm;
use crate::formats::Encoding;

/// Kind of a TOC `<file>` element, from its `<type>` child.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file with heap data.
    File,
    /// Directory; members are nested `<file>` elements.
    Directory,
    /// Symbolic link; target in `<link>`.
    Symlink,
    /// Hard link to another entry.
    Hardlink,
    /// Any other type (fifo, character special, ...).
    Other(String),
}

impl EntryKind {
    /// Parses the text of a `<type>` element.
    #[must_use]
    pub fn from_type(text: &str) -> Self {
        match text.trim() {
            "file" => Self::File,
            "directory" => Self::Directory,
            "symlink" => Self::Symlink,
            "hardlink" => Self::Hardlink,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the `<type>` text for this kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Symlink => "symlink",
            Self::Hardlink => "hardlink",
            Self::Other(other) => other,
        }
    }
}

/// Checksum recorded for member data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryChecksum {
    /// `style` attribute, e.g. `sha1`.
    pub style: String,
    /// Hex digest text.
    pub value: String,
}

impl EntryChecksum {
    /// Resolves the style into a computable algorithm.
    ///
    /// # Errors
    ///
    /// Returns `XarError::UnsupportedChecksum` for unknown styles.
    pub fn algorithm(&self) -> Result<ChecksumAlgorithm> {
        self.style.parse()
    }
}

/// Location and encoding of a member's bytes in the heap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryData {
    /// Stored (possibly compressed) length in the heap.
    pub length: u64,
    /// Offset relative to the start of the heap.
    pub offset: u64,
    /// Length after decoding.
    pub size: u64,
    /// Encoding of the stored bytes.
    pub encoding: Encoding,
    /// Checksum over the stored bytes.
    pub archived_checksum: Option<EntryChecksum>,
    /// Checksum over the decoded bytes.
    pub extracted_checksum: Option<EntryChecksum>,
}

/// One member of a XAR archive. It holds metadata only, not file data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XarEntry {
    /// Value of the `id` attribute.
    pub id: String,
    /// Bare name (single path component).
    pub name: String,
    /// Entry kind.
    pub kind: EntryKind,
    /// Permission bits parsed from the octal `<mode>`.
    pub mode: Option<u32>,
    /// Owner uid.
    pub uid: Option<u32>,
    /// Owner gid.
    pub gid: Option<u32>,
    /// Owner user name.
    pub user: Option<String>,
    /// Owner group name.
    pub group: Option<String>,
    /// Access time.
    pub atime: Option<DateTime<Utc>>,
    /// Modification time.
    pub mtime: Option<DateTime<Utc>>,
    /// Status change time.
    pub ctime: Option<DateTime<Utc>>,
    /// Link target for symlinks, or the original's id for hardlinks.
    pub link: Option<String>,
    /// Heap data, present for regular files.
    pub data: Option<EntryData>,
    /// Nested entries of a directory.
    pub children: Vec<Self>,
}

impl XarEntry {
    /// Creates an entry with only the identifying fields set.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            mode: None,
            uid: None,
            gid: None,
            user: None,
            group: None,
            atime: None,
            mtime: None,
            ctime: None,
            link: None,
            data: None,
            children: Vec::new(),
        }
    }

    /// Returns `true` for regular files.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Returns `true` for directories.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Decoded size of the member's data, zero when it has none.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.as_ref().map_or(0, |d| d.size)
    }

    /// Stored size of the member's data in the heap.
    #[must_use]
    pub fn stored_size(&self) -> u64 {
        self.data.as_ref().map_or(0, |d| d.length)
    }

    /// Encoding of the member's data, if it has any.
    #[must_use]
    pub fn encoding(&self) -> Option<&Encoding> {
        self.data.as_ref().map(|d| &d.encoding)
    }
}
