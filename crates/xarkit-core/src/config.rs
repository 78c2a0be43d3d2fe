//! Extraction configuration.

/// Limits and attribute-restoration switches for extraction.
///
/// Defaults are conservative: symlinks are skipped, permissions and
/// ownership are not restored, checksums are verified.
///
/// # Examples
///
/// ```
/// use xarkit_core::ExtractConfig;
///
/// let config = ExtractConfig::default()
///     .with_max_file_size(10 * 1024 * 1024)
///     .with_preserve_permissions(true);
/// assert!(config.verify_checksums);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Maximum decoded size of a single member in bytes.
    pub max_file_size: u64,

    /// Maximum total decoded size of all members in bytes.
    pub max_total_size: u64,

    /// Maximum number of entries written.
    pub max_file_count: usize,

    /// Verify archived and extracted checksums while reading.
    pub verify_checksums: bool,

    /// Create symlinks whose target stays inside the destination.
    pub allow_symlinks: bool,

    /// Restore `<mode>` permission bits.
    pub preserve_permissions: bool,

    /// Restore `<uid>`/`<gid>` ownership (unix only, usually needs root).
    pub preserve_ownership: bool,

    /// Restore `<atime>`/`<mtime>`.
    pub preserve_times: bool,
}

impl Default for ExtractConfig {
    /// Default values:
    /// - `max_file_size`: 50 MB
    /// - `max_total_size`: 500 MB
    /// - `max_file_count`: 10,000
    /// - `verify_checksums`: true
    /// - `allow_symlinks`: false
    /// - `preserve_permissions`: false
    /// - `preserve_ownership`: false
    /// - `preserve_times`: true
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,   // 50 MB
            max_total_size: 500 * 1024 * 1024, // 500 MB
            max_file_count: 10_000,
            verify_checksums: true,
            allow_symlinks: false,
            preserve_permissions: false,
            preserve_ownership: false,
            preserve_times: true,
        }
    }
}

impl ExtractConfig {
    /// Creates a permissive configuration for trusted archives.
    ///
    /// Symlinks and all attributes are restored and the size limits are
    /// raised. Checksums are still verified.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            max_file_size: u64::MAX,
            max_total_size: u64::MAX,
            max_file_count: usize::MAX,
            allow_symlinks: true,
            preserve_permissions: true,
            preserve_ownership: true,
            ..Default::default()
        }
    }

    /// Sets the single-member size limit.
    #[must_use]
    pub const fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Sets the total size limit.
    #[must_use]
    pub const fn with_max_total_size(mut self, bytes: u64) -> Self {
        self.max_total_size = bytes;
        self
    }

    /// Sets the entry count limit.
    #[must_use]
    pub const fn with_max_file_count(mut self, count: usize) -> Self {
        self.max_file_count = count;
        self
    }

    /// Enables or disables checksum verification.
    #[must_use]
    pub const fn with_verify_checksums(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }

    /// Enables or disables symlink creation.
    #[must_use]
    pub const fn with_allow_symlinks(mut self, allow: bool) -> Self {
        self.allow_symlinks = allow;
        self
    }

    /// Enables or disables permission restoration.
    #[must_use]
    pub const fn with_preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
        self
    }

    /// Enables or disables ownership restoration.
    #[must_use]
    pub const fn with_preserve_ownership(mut self, preserve: bool) -> Self {
        self.preserve_ownership = preserve;
        self
    }

    /// Enables or disables timestamp restoration.
    #[must_use]
    pub const fn with_preserve_times(mut self, preserve: bool) -> Self {
        self.preserve_times = preserve;
        self
    }
}
