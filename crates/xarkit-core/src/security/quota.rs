//! Extraction quota tracking.

use crate::ExtractConfig;
use crate::QuotaResource;
use crate::Result;
use crate::XarError;

/// Tracks resource usage during extraction.
#[derive(Debug, Default)]
pub struct QuotaTracker {
    entries_written: usize,
    bytes_written: u64,
}

impl QuotaTracker {
    /// Creates a new quota tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an entry about to be written with `size` decoded bytes.
    ///
    /// # Errors
    ///
    /// Returns `XarError::QuotaExceeded` if a limit would be crossed.
    pub fn record(&mut self, size: u64, config: &ExtractConfig) -> Result<()> {
        if size > config.max_file_size {
            return Err(quota(QuotaResource::FileSize {
                size,
                max: config.max_file_size,
            }));
        }

        let entries = self
            .entries_written
            .checked_add(1)
            .ok_or_else(|| quota(QuotaResource::IntegerOverflow))?;
        if entries > config.max_file_count {
            return Err(quota(QuotaResource::FileCount {
                current: entries,
                max: config.max_file_count,
            }));
        }

        let bytes = self
            .bytes_written
            .checked_add(size)
            .ok_or_else(|| quota(QuotaResource::IntegerOverflow))?;
        if bytes > config.max_total_size {
            return Err(quota(QuotaResource::TotalSize {
                current: bytes,
                max: config.max_total_size,
            }));
        }

        self.entries_written = entries;
        self.bytes_written = bytes;
        Ok(())
    }

    /// Returns the number of entries recorded.
    #[must_use]
    pub fn entries_written(&self) -> usize {
        self.entries_written
    }

    /// Returns the total bytes recorded.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

fn quota(resource: QuotaResource) -> XarError {
    XarError::QuotaExceeded { resource }
}
