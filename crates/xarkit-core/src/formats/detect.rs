//! XAR format detection.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::Result;
use crate::formats::header::XAR_MAGIC;

/// Returns `true` if `bytes` start with the XAR magic.
#[must_use]
pub fn has_xar_magic(bytes: &[u8]) -> bool {
    bytes.len() >= XAR_MAGIC.len() && bytes[..XAR_MAGIC.len()] == XAR_MAGIC
}

/// Checks whether the file at `path` is a XAR archive this crate can read.
///
/// Only the magic is inspected; a file that passes may still fail to open if
/// the rest of the header or the TOC is damaged. Files shorter than four
/// bytes are reported as not XAR rather than as an error.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
///
/// # Examples
///
/// ```no_run
/// use xarkit_core::is_xar_file;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// if is_xar_file("Installer.pkg")? {
///     println!("flat package");
/// }
/// # Ok(())
/// # }
/// ```
pub fn is_xar_file<P: AsRef<Path>>(path: P) -> Result<bool> {
    let mut file = File::open(path.as_ref())?;
    let mut magic = Vec::with_capacity(XAR_MAGIC.len());
    file.by_ref()
        .take(XAR_MAGIC.len() as u64)
        .read_to_end(&mut magic)?;
    Ok(has_xar_magic(&magic))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_has_xar_magic() {
        assert!(has_xar_magic(b"xar!\x00\x1c"));
        assert!(!has_xar_magic(b"xar"));
        assert!(!has_xar_magic(b"PK\x03\x04"));
        assert!(!has_xar_magic(b""));
    }

    #[test]
    fn test_is_xar_file() {
        let temp = TempDir::new().unwrap();
        let xar = temp.path().join("a.xar");
        let txt = temp.path().join("a.txt");
        let tiny = temp.path().join("tiny");
        fs::write(&xar, b"xar!rest-of-header").unwrap();
        fs::write(&txt, b"hello world").unwrap();
        fs::write(&tiny, b"xa").unwrap();

        assert!(is_xar_file(&xar).unwrap());
        assert!(!is_xar_file(&txt).unwrap());
        assert!(!is_xar_file(&tiny).unwrap());
    }

    #[test]
    fn test_is_xar_file_missing() {
        let temp = TempDir::new().unwrap();
        assert!(is_xar_file(temp.path().join("missing.xar")).is_err());
    }
}
