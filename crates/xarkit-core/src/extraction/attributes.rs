//! Restoration of timestamps, permissions and ownership.

use std::fs::File;
use std::fs::FileTimes;
use std::path::Path;
use std::time::SystemTime;

use crate::ExtractConfig;
use crate::Result;
use crate::toc::XarEntry;

/// Applies the attributes `config` asks for to an extracted path.
///
/// Times are applied first, then ownership, then permissions, so a
/// read-only mode cannot block the earlier steps. Symlinks are left alone.
///
/// # Errors
///
/// Returns the first I/O error encountered.
pub fn restore(path: &Path, entry: &XarEntry, config: &ExtractConfig) -> Result<()> {
    if entry.kind == crate::EntryKind::Symlink {
        return Ok(());
    }

    if config.preserve_times {
        restore_times(path, entry)?;
    }

    #[cfg(unix)]
    if config.preserve_ownership && (entry.uid.is_some() || entry.gid.is_some()) {
        std::os::unix::fs::chown(path, entry.uid, entry.gid)?;
    }

    #[cfg(unix)]
    if config.preserve_permissions
        && let Some(mode) = entry.mode
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = crate::security::sanitize_mode(mode);
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
    }

    Ok(())
}

fn restore_times(path: &Path, entry: &XarEntry) -> Result<()> {
    if entry.atime.is_none() && entry.mtime.is_none() {
        return Ok(());
    }

    let mut times = FileTimes::new();
    if let Some(atime) = entry.atime {
        times = times.set_accessed(SystemTime::from(atime));
    }
    if let Some(mtime) = entry.mtime {
        times = times.set_modified(SystemTime::from(mtime));
    }
    File::open(path)?.set_times(times)?;
    Ok(())
}
