//! Archive inspection without extraction.
//!
//! # Examples
//!
//! ```no_run
//! use xarkit_core::inspect_archive;
//! use xarkit_core::list_archive;
//! use xarkit_core::verify_archive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manifest = list_archive("test-toc-sha256.xar")?;
//! println!("{} entries", manifest.total_entries);
//!
//! let inspection = inspect_archive("test-toc-sha256.xar")?;
//! assert_eq!(inspection.toc_checksum.as_deref(), Some("sha256"));
//!
//! let report = verify_archive("test-toc-sha256.xar")?;
//! println!("verification: {}", report.status);
//! # Ok(())
//! # }
//! ```

pub mod inspect;
pub mod list;
pub mod manifest;
pub mod report;
pub mod verify;

pub use inspect::ArchiveInspection;
pub use inspect::inspect_archive;
pub use list::list_archive;
pub use manifest::ArchiveManifest;
pub use manifest::ManifestEntry;
pub use report::CheckStatus;
pub use report::IssueCategory;
pub use report::IssueSeverity;
pub use report::VerificationIssue;
pub use report::VerificationReport;
pub use report::VerificationStatus;
pub use verify::verify_archive;
