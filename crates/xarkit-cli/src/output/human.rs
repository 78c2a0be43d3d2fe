//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use std::collections::BTreeSet;
use std::path::Path;
use xarkit_core::ArchiveInspection;
use xarkit_core::ArchiveManifest;
use xarkit_core::EntryKind;
use xarkit_core::ExtractionReport;
use xarkit_core::FixtureReport;
use xarkit_core::InvocationOutcome;
use xarkit_core::VerificationReport;
use xarkit_core::VerificationStatus;
use xarkit_core::inspection::IssueSeverity;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
    err_term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
            err_term: Term::stderr(),
        }
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    fn check(&self) -> String {
        if self.use_colors {
            style("✓").green().bold().to_string()
        } else {
            "OK".to_string()
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    fn join_set(set: &BTreeSet<String>) -> String {
        if set.is_empty() {
            "-".to_string()
        } else {
            set.iter().cloned().collect::<Vec<_>>().join(", ")
        }
    }

    const fn type_char(kind: &EntryKind) -> char {
        match kind {
            EntryKind::File => '-',
            EntryKind::Directory => 'd',
            EntryKind::Symlink => 'l',
            EntryKind::Hardlink => 'h',
            EntryKind::Other(_) => '?',
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_fixture_report(&self, report: &FixtureReport) -> Result<()> {
        for result in &report.results {
            match &result.outcome {
                InvocationOutcome::Created => {
                    if !self.quiet {
                        self.line(&format!("{} {}", self.check(), result.output.display()));
                    }
                }
                InvocationOutcome::Failed(e) => {
                    let label = if self.use_colors {
                        style("FAILED").red().bold().to_string()
                    } else {
                        "FAILED".to_string()
                    };
                    let _ = self
                        .err_term
                        .write_line(&format!("{label} {}: {e}", result.name));
                }
                InvocationOutcome::Skipped(reason) => {
                    if self.verbose {
                        self.line(&format!("- {} skipped: {reason}", result.name));
                    }
                }
            }
        }

        if !self.quiet {
            self.line(&format!(
                "Fixtures: {} created, {} failed, {} skipped",
                report.created(),
                report.failed(),
                report.skipped()
            ));
        }

        Ok(())
    }

    fn format_creation_result(&self, output_path: &Path) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.line(&format!(
            "{} Archive created: {}",
            self.check(),
            output_path.display()
        ));
        Ok(())
    }

    fn format_manifest_short(&self, manifest: &ArchiveManifest) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for entry in &manifest.entries {
            self.line(&entry.path);
        }

        Ok(())
    }

    fn format_manifest_long(&self, manifest: &ArchiveManifest, human_readable: bool) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for entry in &manifest.entries {
            let size_str = if human_readable {
                Self::format_size(entry.size)
            } else {
                entry.size.to_string()
            };

            let mode_str = entry
                .mode
                .map_or_else(|| "-".to_string(), |m| format!("{m:o}"));

            let mtime = entry
                .mtime
                .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());

            let name = match &entry.link_target {
                Some(target) => format!("{} -> {target}", entry.path),
                None => entry.path.clone(),
            };

            self.line(&format!(
                "{}{:<6} {:>10}  {}  {}",
                Self::type_char(&entry.kind),
                mode_str,
                size_str,
                mtime,
                name
            ));
        }

        self.line("");
        self.line(&format!(
            "Total: {} entries, {}",
            Self::format_number(manifest.total_entries),
            Self::format_size(manifest.total_size)
        ));

        Ok(())
    }

    fn format_inspection(
        &self,
        archive: &Path,
        inspection: &ArchiveInspection,
        toc_xml: Option<&str>,
    ) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let title = archive.display().to_string();
        if self.use_colors {
            self.line(&style(title).bold().to_string());
        } else {
            self.line(&title);
        }

        self.line(&format!("  Format version:   {}", inspection.version));
        self.line(&format!(
            "  Header checksum:  {}",
            inspection.header_checksum
        ));
        self.line(&format!(
            "  TOC checksum:     {}",
            inspection.toc_checksum.as_deref().unwrap_or("-")
        ));
        self.line(&format!(
            "  File checksums:   {}",
            Self::join_set(&inspection.archived_checksums)
        ));
        if inspection.extracted_checksums != inspection.archived_checksums {
            self.line(&format!(
                "  Extracted sums:   {}",
                Self::join_set(&inspection.extracted_checksums)
            ));
        }
        self.line(&format!(
            "  Encodings:        {}",
            Self::join_set(&inspection.encodings)
        ));
        self.line(&format!(
            "  Members:          {} ({} files)",
            Self::format_number(inspection.member_count),
            Self::format_number(inspection.file_count)
        ));

        if self.verbose {
            self.line(&format!(
                "  TOC size:         {} compressed, {} inflated",
                inspection.toc_compressed_size, inspection.toc_uncompressed_size
            ));
            self.line(&format!("  Header size:      {}", inspection.header_size));
            if let Some(created) = inspection.creation_time {
                self.line(&format!("  Created:          {}", created.to_rfc3339()));
            }
            self.line(&format!(
                "  Signed:           {}",
                if inspection.signed { "yes" } else { "no" }
            ));
        }

        if let Some(xml) = toc_xml {
            self.line("");
            self.line(xml.trim_end());
        }

        Ok(())
    }

    fn format_verification_report(&self, report: &VerificationReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.use_colors {
            let status_str = match report.status {
                VerificationStatus::Pass => style("PASSED").green().bold(),
                VerificationStatus::Warning => style("WARNING").yellow().bold(),
                VerificationStatus::Fail => style("FAILED").red().bold(),
            };
            self.line(&format!("Archive verification: {status_str}"));
        } else {
            self.line(&format!("Archive verification: {}", report.status));
        }

        let toc = match &report.toc_algorithm {
            Some(alg) => format!("{} ({alg})", report.toc_status),
            None => report.toc_status.to_string(),
        };
        self.line(&format!("  TOC checksum: {toc}"));
        self.line(&format!(
            "  Members: {} ({} checked)",
            report.members_status,
            Self::format_number(report.members_checked)
        ));
        self.line(&format!(
            "  Total entries: {}",
            Self::format_number(report.total_entries)
        ));

        if !report.issues.is_empty() {
            self.line("");
            self.line("Issues:");

            for issue in &report.issues {
                let severity_str = if self.use_colors {
                    match issue.severity {
                        IssueSeverity::Critical => style("CRITICAL").red().bold().to_string(),
                        IssueSeverity::High => style("HIGH").red().to_string(),
                        IssueSeverity::Medium => style("MEDIUM").yellow().to_string(),
                    }
                } else {
                    format!("[{}]", issue.severity)
                };

                if let Some(ref path) = issue.entry_path {
                    self.line(&format!("  {severity_str} {path}: {}", issue.message));
                } else {
                    self.line(&format!("  {severity_str} {}", issue.message));
                }
            }
        }

        Ok(())
    }

    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.line(&format!("{} Extraction complete", self.check()));
        self.line(&format!("  Files extracted: {}", report.files_extracted));
        self.line(&format!("  Directories: {}", report.directories_created));
        self.line(&format!(
            "  Total size: {}",
            Self::format_size(report.bytes_written)
        ));

        if self.verbose {
            self.line(&format!("  Symlinks: {}", report.symlinks_created));
            self.line(&format!("  Duration: {:?}", report.duration));
        }

        if report.has_warnings() {
            self.line("");
            if self.use_colors {
                self.line(&style("Warnings:").yellow().bold().to_string());
            } else {
                self.line("Warnings:");
            }
            for warning in &report.warnings {
                self.line(&format!("  - {warning}"));
            }
        }

        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        if self.use_colors {
            let _ = self
                .err_term
                .write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = self.err_term.write_line(&format!("ERROR: {error:?}"));
        }
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .err_term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.err_term.write_line(&format!("WARNING: {message}"));
        }
    }
}
