//! Archive listing implementation.

use std::io::Read;
use std::io::Seek;
use std::path::Path;

use crate::Result;
use crate::XarArchive;
use crate::inspection::manifest::ArchiveManifest;
use crate::inspection::manifest::ManifestEntry;

/// Lists archive contents without extracting.
///
/// Only the table of contents is read; member data is not touched.
///
/// # Errors
///
/// Returns an error if the archive cannot be opened or its header or table
/// of contents is malformed.
///
/// # Examples
///
/// ```no_run
/// use xarkit_core::list_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let manifest = list_archive("test.xar")?;
/// for entry in &manifest.entries {
///     println!("{}: {} bytes", entry.path, entry.size);
/// }
/// # Ok(())
/// # }
/// ```
pub fn list_archive<P: AsRef<Path>>(archive_path: P) -> Result<ArchiveManifest> {
    let archive = XarArchive::open(archive_path)?;
    Ok(manifest_of(&archive))
}

/// Builds the manifest of an already opened archive.
#[must_use]
pub fn manifest_of<R: Read + Seek>(archive: &XarArchive<R>) -> ArchiveManifest {
    let mut manifest = ArchiveManifest::new();
    for (path, entry) in archive.members() {
        manifest.add_entry(ManifestEntry::from_entry(path, entry));
    }
    manifest
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::EntryKind;
    use crate::formats::Encoding;
    use crate::test_utils::XarTestBuilder;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_list_archive() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("test.xar");
        let bytes = XarTestBuilder::new()
            .encoding(Encoding::Bzip2)
            .add_file("test.txt", b"abcdef")
            .add_symlink("dir/link", "../test.txt")
            .build();
        fs::write(&path, bytes).unwrap();

        let manifest = list_archive(&path).unwrap();
        assert_eq!(manifest.total_entries, 3);
        assert_eq!(manifest.total_size, 6);

        let paths: Vec<&str> = manifest.entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["test.txt", "dir", "dir/link"]);

        let file = &manifest.entries[0];
        assert_eq!(file.kind, EntryKind::File);
        assert_eq!(file.encoding, Some(Encoding::Bzip2));
        assert_eq!(file.mode, Some(0o644));
        assert!(file.mtime.is_some());

        let link = &manifest.entries[2];
        assert_eq!(link.kind, EntryKind::Symlink);
        assert_eq!(link.link_target.as_deref(), Some("../test.txt"));
    }

    #[test]
    fn test_list_not_xar() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("plain.txt");
        fs::write(&path, b"this is not an archive at all, just text").unwrap();
        assert!(matches!(
            list_archive(&path),
            Err(crate::XarError::NotXar)
        ));
    }
}
