//! Output formatter trait for CLI results.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use xarkit_core::ArchiveInspection;
use xarkit_core::ArchiveManifest;
use xarkit_core::ExtractionReport;
use xarkit_core::FixtureReport;
use xarkit_core::VerificationReport;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the outcome of a fixture run
    fn format_fixture_report(&self, report: &FixtureReport) -> Result<()>;

    /// Format a created archive
    fn format_creation_result(&self, output_path: &Path) -> Result<()>;

    /// Format archive listing (names only)
    fn format_manifest_short(&self, manifest: &ArchiveManifest) -> Result<()>;

    /// Format archive listing with kind, mode and size
    fn format_manifest_long(&self, manifest: &ArchiveManifest, human_readable: bool) -> Result<()>;

    /// Format checksum and encoding summary, optionally with the TOC XML
    fn format_inspection(
        &self,
        archive: &Path,
        inspection: &ArchiveInspection,
        toc_xml: Option<&str>,
    ) -> Result<()>;

    /// Format verification report
    fn format_verification_report(&self, report: &VerificationReport) -> Result<()>;

    /// Format extraction result
    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()>;

    /// Format error message
    fn format_error(&self, error: &anyhow::Error);

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> JsonOutput<()> {
        JsonOutput {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}
