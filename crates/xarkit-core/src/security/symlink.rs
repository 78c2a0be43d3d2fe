//! Symlink target validation.
//!
//! Two layers: [`symlink_stays_inside`] is purely lexical and needs no
//! filesystem, [`symlink_resolves_inside`] additionally follows links that
//! already exist under the destination, so a chain of individually harmless
//! links cannot point outside it. [`verify_no_symlink_ancestors`] keeps file
//! writes from passing through such links.

use std::collections::VecDeque;
use std::ffi::OsString;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::Result;
use crate::XarError;

/// Upper bound on links followed while resolving one target.
pub const MAX_LINK_HOPS: usize = 40;

/// Returns `true` if a symlink at `link_path` (relative to the extraction
/// root) pointing at `target` resolves inside the root.
///
/// Resolution is lexical: `..` pops a component, and popping past the root
/// fails. Absolute targets always fail.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use xarkit_core::security::symlink_stays_inside;
///
/// assert!(symlink_stays_inside(Path::new("docs/link"), Path::new("../test.txt")));
/// assert!(!symlink_stays_inside(Path::new("link"), Path::new("../../etc/passwd")));
/// ```
#[must_use]
pub fn symlink_stays_inside(link_path: &Path, target: &Path) -> bool {
    let mut depth: usize = link_path
        .parent()
        .map_or(0, |p| p.components().filter(|c| matches!(c, Component::Normal(_))).count());

    for component in target.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    true
}

/// Returns `true` if a symlink at `link_path` (relative to `dest`) pointing
/// at `target` resolves inside `dest`, following links already on disk.
///
/// Every intermediate component that is a symlink under `dest` is replaced
/// by its own target, up to [`MAX_LINK_HOPS`] times. Absolute targets,
/// unreadable links and resolution past `dest` all fail.
#[must_use]
pub fn symlink_resolves_inside(dest: &Path, link_path: &Path, target: &Path) -> bool {
    let mut resolved: Vec<OsString> = match link_path.parent() {
        Some(parent) => match normal_components(parent) {
            Some(parts) => parts,
            None => return false,
        },
        None => Vec::new(),
    };
    let Some(mut pending) = relative_components(target) else {
        return false;
    };
    let mut hops = 0;

    while let Some(part) = pending.pop_front() {
        if part == "." {
            continue;
        }
        if part == ".." {
            if resolved.pop().is_none() {
                return false;
            }
            continue;
        }

        resolved.push(part);
        let on_disk: PathBuf = dest.join(resolved.iter().collect::<PathBuf>());
        let is_link = std::fs::symlink_metadata(&on_disk)
            .is_ok_and(|meta| meta.file_type().is_symlink());
        if !is_link {
            continue;
        }

        hops += 1;
        if hops > MAX_LINK_HOPS {
            return false;
        }
        let Ok(next) = std::fs::read_link(&on_disk) else {
            return false;
        };
        let Some(next_parts) = relative_components(&next) else {
            return false;
        };
        resolved.pop();
        for part in next_parts.into_iter().rev() {
            pending.push_front(part);
        }
    }
    true
}

/// Fails if any existing component of `rel` under `dest` is a symlink.
///
/// Called before creating directories or files so that nothing is written
/// through a link left by this or an earlier extraction.
///
/// # Errors
///
/// Returns `XarError::PathTraversal` naming `rel` if a symlink is found.
pub fn verify_no_symlink_ancestors(dest: &Path, rel: &Path) -> Result<()> {
    let mut current = dest.to_path_buf();
    for component in rel.components() {
        current.push(component);
        match std::fs::symlink_metadata(&current) {
            Ok(meta) if meta.file_type().is_symlink() => {
                return Err(XarError::PathTraversal {
                    path: rel.to_path_buf(),
                });
            }
            Ok(_) => {}
            // Nothing below a missing component can exist yet.
            Err(_) => break,
        }
    }
    Ok(())
}

fn normal_components(path: &Path) -> Option<Vec<OsString>> {
    path.components()
        .map(|c| match c {
            Component::Normal(name) => Some(name.to_os_string()),
            _ => None,
        })
        .collect()
}

fn relative_components(path: &Path) -> Option<VecDeque<OsString>> {
    path.components()
        .map(|c| match c {
            Component::Normal(name) => Some(name.to_os_string()),
            Component::CurDir => Some(OsString::from(".")),
            Component::ParentDir => Some(OsString::from("..")),
            Component::RootDir | Component::Prefix(_) => None,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_targets() {
        assert!(symlink_stays_inside(Path::new("link"), Path::new("test.txt")));
        assert!(symlink_stays_inside(Path::new("a/b/link"), Path::new("../../x")));
        assert!(symlink_stays_inside(Path::new("a/link"), Path::new("./b/../c")));
    }

    #[test]
    fn test_escaping_targets() {
        assert!(!symlink_stays_inside(Path::new("link"), Path::new("..")));
        assert!(!symlink_stays_inside(Path::new("a/link"), Path::new("../../x")));
        assert!(!symlink_stays_inside(Path::new("link"), Path::new("/etc/passwd")));
        assert!(!symlink_stays_inside(Path::new("a/link"), Path::new("b/../../../x")));
    }

    #[cfg(unix)]
    mod on_disk {
        use super::super::*;
        use std::os::unix::fs::symlink;
        use tempfile::TempDir;

        #[test]
        fn test_chain_through_existing_link_escapes() {
            let temp = TempDir::new().unwrap();
            let dest = temp.path().join("out");
            std::fs::create_dir_all(dest.join("d")).unwrap();
            symlink("..", dest.join("d/up")).unwrap();

            // Lexically harmless, but d/up already points at the root.
            assert!(symlink_stays_inside(Path::new("esc"), Path::new("d/up/..")));
            assert!(!symlink_resolves_inside(&dest, Path::new("esc"), Path::new("d/up/..")));
            assert!(symlink_resolves_inside(&dest, Path::new("ok"), Path::new("d/up")));
        }

        #[test]
        fn test_link_cycle_rejected() {
            let temp = TempDir::new().unwrap();
            let dest = temp.path();
            symlink("b", dest.join("a")).unwrap();
            symlink("a", dest.join("b")).unwrap();
            assert!(!symlink_resolves_inside(dest, Path::new("c"), Path::new("a/x")));
        }

        #[test]
        fn test_plain_targets_without_links() {
            let temp = TempDir::new().unwrap();
            let dest = temp.path();
            assert!(symlink_resolves_inside(dest, Path::new("docs/link"), Path::new("../test.txt")));
            assert!(!symlink_resolves_inside(dest, Path::new("link"), Path::new("../x")));
            assert!(!symlink_resolves_inside(dest, Path::new("link"), Path::new("/etc/passwd")));
        }

        #[test]
        fn test_symlink_ancestor_detected() {
            let temp = TempDir::new().unwrap();
            let dest = temp.path().join("out");
            std::fs::create_dir_all(dest.join("real")).unwrap();
            symlink("..", dest.join("esc")).unwrap();

            assert!(verify_no_symlink_ancestors(&dest, Path::new("real/file")).is_ok());
            assert!(verify_no_symlink_ancestors(&dest, Path::new("missing/deeper")).is_ok());
            assert!(matches!(
                verify_no_symlink_ancestors(&dest, Path::new("esc/pwned.txt")),
                Err(XarError::PathTraversal { .. })
            ));
        }
    }
}
