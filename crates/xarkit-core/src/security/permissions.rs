//! File permission sanitization.

/// Strips setuid, setgid and sticky bits from an archived mode.
///
/// Only the rwx bits of `<mode>` are ever applied to extracted files.
#[must_use]
pub const fn sanitize_mode(mode: u32) -> u32 {
    mode & 0o777
}
