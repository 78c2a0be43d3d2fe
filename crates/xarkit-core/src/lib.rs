//! XAR archive fixtures, reading and verification.
//!
//! `xarkit-core` drives the external `xar` archiver to produce archives with
//! chosen table-of-contents checksums, per-file checksums and compression,
//! and reads the results back: header and TOC parsing, member listing,
//! checksum verification and safe extraction.
//!
//! # Examples
//!
//! ```no_run
//! use xarkit_core::archiver::Archiver;
//! use xarkit_core::archiver::FixturePlan;
//! use xarkit_core::archiver::run_plan;
//! use xarkit_core::inspect_archive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let archiver = Archiver::locate()?;
//! let report = run_plan(&FixturePlan::standard(), Some(&archiver));
//! println!("{} fixtures created", report.created());
//!
//! let inspection = inspect_archive("test-toc-sha512.xar")?;
//! assert_eq!(inspection.toc_checksum.as_deref(), Some("sha512"));
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod archive;
pub mod archiver;
pub mod config;
pub mod error;
pub mod extraction;
pub mod formats;
pub mod inspection;
pub mod report;
pub mod security;
pub mod toc;

#[doc(hidden)]
pub mod test_utils;

// Re-export main API types
pub use api::create_archive;
pub use api::create_archive_with;
pub use api::generate_fixtures;
pub use archive::XarArchive;
pub use archiver::Archiver;
pub use archiver::ArchiverOptions;
pub use archiver::FixturePlan;
pub use archiver::FixtureReport;
pub use archiver::Invocation;
pub use archiver::InvocationOutcome;
pub use config::ExtractConfig;
pub use error::QuotaResource;
pub use error::Result;
pub use error::XarError;
pub use extraction::extract_archive;
pub use extraction::extract_archive_with_progress;
pub use formats::is_xar_file;
pub use inspection::ArchiveInspection;
pub use inspection::ArchiveManifest;
pub use inspection::ManifestEntry;
pub use inspection::VerificationReport;
pub use inspection::VerificationStatus;
pub use inspection::inspect_archive;
pub use inspection::list_archive;
pub use inspection::verify_archive;
pub use report::ExtractionReport;
pub use report::NoopProgress;
pub use report::ProgressCallback;
pub use toc::EntryKind;
pub use toc::XarEntry;
