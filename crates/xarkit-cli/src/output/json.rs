//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;
use xarkit_core::ArchiveInspection;
use xarkit_core::ArchiveManifest;
use xarkit_core::ExtractionReport;
use xarkit_core::FixtureReport;
use xarkit_core::InvocationOutcome;
use xarkit_core::VerificationReport;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }

    fn manifest(manifest: &ArchiveManifest) -> ManifestOutput {
        ManifestOutput {
            total_entries: manifest.total_entries,
            total_size: manifest.total_size,
            total_stored_size: manifest.total_stored_size,
            entries: manifest
                .entries
                .iter()
                .map(|e| EntryOutput {
                    path: e.path.clone(),
                    kind: e.kind.as_str().to_string(),
                    size: e.size,
                    stored_size: e.stored_size,
                    mode: e.mode.map(|m| format!("{m:o}")),
                    mtime: e.mtime.map(|t| t.to_rfc3339()),
                    user: e.user.clone(),
                    group: e.group.clone(),
                    encoding: e.encoding.as_ref().map(|enc| enc.style().to_string()),
                    link_target: e.link_target.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct EntryOutput {
    path: String,
    kind: String,
    size: u64,
    stored_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mtime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link_target: Option<String>,
}

#[derive(Serialize)]
struct ManifestOutput {
    total_entries: usize,
    total_size: u64,
    total_stored_size: u64,
    entries: Vec<EntryOutput>,
}

impl OutputFormatter for JsonFormatter {
    fn format_fixture_report(&self, report: &FixtureReport) -> Result<()> {
        #[derive(Serialize)]
        struct FixtureOutput {
            name: String,
            output: String,
            outcome: &'static str,
            #[serde(skip_serializing_if = "Option::is_none")]
            detail: Option<String>,
        }

        #[derive(Serialize)]
        struct FixturesOutput {
            created: usize,
            failed: usize,
            skipped: usize,
            duration_ms: u128,
            fixtures: Vec<FixtureOutput>,
        }

        let data = FixturesOutput {
            created: report.created(),
            failed: report.failed(),
            skipped: report.skipped(),
            duration_ms: report.duration.as_millis(),
            fixtures: report
                .results
                .iter()
                .map(|r| FixtureOutput {
                    name: r.name.clone(),
                    output: r.output.display().to_string(),
                    outcome: r.outcome.label(),
                    detail: match &r.outcome {
                        InvocationOutcome::Created => None,
                        InvocationOutcome::Failed(e) => Some(e.to_string()),
                        InvocationOutcome::Skipped(reason) => Some(reason.clone()),
                    },
                })
                .collect(),
        };

        Self::output(&JsonOutput::success("fixtures", data))
    }

    fn format_creation_result(&self, output_path: &Path) -> Result<()> {
        #[derive(Serialize)]
        struct CreationOutput {
            output_path: String,
        }

        let data = CreationOutput {
            output_path: output_path.display().to_string(),
        };
        Self::output(&JsonOutput::success("create", data))
    }

    fn format_manifest_short(&self, manifest: &ArchiveManifest) -> Result<()> {
        Self::output(&JsonOutput::success("list", Self::manifest(manifest)))
    }

    fn format_manifest_long(&self, manifest: &ArchiveManifest, _human_readable: bool) -> Result<()> {
        Self::output(&JsonOutput::success("list", Self::manifest(manifest)))
    }

    fn format_inspection(
        &self,
        archive: &Path,
        inspection: &ArchiveInspection,
        toc_xml: Option<&str>,
    ) -> Result<()> {
        #[derive(Serialize)]
        struct InspectionOutput<'a> {
            archive: String,
            version: u16,
            header_size: u16,
            header_checksum: &'a str,
            toc_checksum: Option<&'a str>,
            file_checksum: Option<&'a str>,
            archived_checksums: Vec<&'a str>,
            extracted_checksums: Vec<&'a str>,
            encodings: Vec<&'a str>,
            toc_compressed_size: u64,
            toc_uncompressed_size: u64,
            creation_time: Option<String>,
            member_count: usize,
            file_count: usize,
            signed: bool,
            #[serde(skip_serializing_if = "Option::is_none")]
            toc: Option<&'a str>,
        }

        let data = InspectionOutput {
            archive: archive.display().to_string(),
            version: inspection.version,
            header_size: inspection.header_size,
            header_checksum: &inspection.header_checksum,
            toc_checksum: inspection.toc_checksum.as_deref(),
            file_checksum: inspection.file_checksum(),
            archived_checksums: inspection.archived_checksums.iter().map(String::as_str).collect(),
            extracted_checksums: inspection
                .extracted_checksums
                .iter()
                .map(String::as_str)
                .collect(),
            encodings: inspection.encodings.iter().map(String::as_str).collect(),
            toc_compressed_size: inspection.toc_compressed_size,
            toc_uncompressed_size: inspection.toc_uncompressed_size,
            creation_time: inspection.creation_time.map(|t| t.to_rfc3339()),
            member_count: inspection.member_count,
            file_count: inspection.file_count,
            signed: inspection.signed,
            toc: toc_xml,
        };

        Self::output(&JsonOutput::success("inspect", data))
    }

    fn format_verification_report(&self, report: &VerificationReport) -> Result<()> {
        #[derive(Serialize)]
        struct IssueOutput {
            severity: String,
            category: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            entry_path: Option<String>,
            message: String,
        }

        #[derive(Serialize)]
        struct VerificationOutput {
            status: String,
            toc_status: String,
            toc_algorithm: Option<String>,
            members_status: String,
            members_checked: usize,
            total_entries: usize,
            issues: Vec<IssueOutput>,
        }

        let data = VerificationOutput {
            status: report.status.to_string(),
            toc_status: report.toc_status.to_string(),
            toc_algorithm: report.toc_algorithm.clone(),
            members_status: report.members_status.to_string(),
            members_checked: report.members_checked,
            total_entries: report.total_entries,
            issues: report
                .issues
                .iter()
                .map(|i| IssueOutput {
                    severity: i.severity.to_string(),
                    category: i.category.to_string(),
                    entry_path: i.entry_path.clone(),
                    message: i.message.clone(),
                })
                .collect(),
        };

        Self::output(&JsonOutput::success("verify", data))
    }

    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()> {
        #[derive(Serialize)]
        struct ExtractionOutput {
            files_extracted: usize,
            directories_created: usize,
            symlinks_created: usize,
            entries_skipped: usize,
            bytes_written: u64,
            duration_ms: u128,
            warnings: Vec<String>,
        }

        let data = ExtractionOutput {
            files_extracted: report.files_extracted,
            directories_created: report.directories_created,
            symlinks_created: report.symlinks_created,
            entries_skipped: report.entries_skipped,
            bytes_written: report.bytes_written,
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
        };

        Self::output(&JsonOutput::success("extract", data))
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::<()>::error("unknown", format!("{error:#}"));
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use xarkit_core::XarArchive;
    use xarkit_core::inspection::list::manifest_of;
    use xarkit_core::test_utils::XarTestBuilder;

    #[test]
    fn test_manifest_output_structure() {
        let bytes = XarTestBuilder::new()
            .add_file_with_mode("test.txt", b"hello", 0o644)
            .add_symlink("link", "test.txt")
            .build();
        let archive = XarArchive::from_reader(Cursor::new(bytes)).unwrap();
        let manifest = JsonFormatter::manifest(&manifest_of(&archive));

        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["total_entries"], 2);
        assert_eq!(json["entries"][0]["path"], "test.txt");
        assert_eq!(json["entries"][0]["kind"], "file");
        assert_eq!(json["entries"][0]["mode"], "644");
        assert_eq!(json["entries"][0]["encoding"], "application/x-gzip");
        assert_eq!(json["entries"][1]["link_target"], "test.txt");
        assert!(json["entries"][1].get("encoding").is_none());
    }

    #[test]
    fn test_error_output_structure() {
        let output = JsonOutput::<()>::error("verify", "boom");
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "boom");
        assert!(json.get("data").is_none());
    }
}
