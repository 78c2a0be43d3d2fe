//! Entry name validation.

use std::path::PathBuf;

use crate::Result;
use crate::XarError;

/// Validates a single `<name>` from the table of contents.
///
/// XAR stores one path component per `<file>` element, so a name that
/// contains a separator, a NUL byte, or is `.`, `..` or empty can only be an
/// attempt to write outside the destination. `path` is the already-joined
/// member path, reported in the error.
///
/// # Errors
///
/// Returns `XarError::PathTraversal` for unsafe names.
///
/// # Examples
///
/// ```
/// use xarkit_core::security::validate_entry_name;
///
/// assert!(validate_entry_name("test.txt", "test.txt").is_ok());
/// assert!(validate_entry_name("..", "docs/..").is_err());
/// assert!(validate_entry_name("etc/passwd", "etc/passwd").is_err());
/// ```
pub fn validate_entry_name(name: &str, path: &str) -> Result<()> {
    let unsafe_name = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);

    if unsafe_name {
        return Err(XarError::PathTraversal {
            path: PathBuf::from(path),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_pass() {
        assert!(validate_entry_name("test.txt", "test.txt").is_ok());
        assert!(validate_entry_name(".hidden", ".hidden").is_ok());
        assert!(validate_entry_name("..dots", "..dots").is_ok());
        assert!(validate_entry_name("name with spaces", "x").is_ok());
    }

    #[test]
    fn test_traversal_rejected() {
        for name in ["", ".", "..", "../etc", "a/b", "/abs", "a\\b", "nul\0"] {
            let result = validate_entry_name(name, name);
            assert!(
                matches!(result, Err(XarError::PathTraversal { .. })),
                "{name:?} should be rejected"
            );
        }
    }
}
