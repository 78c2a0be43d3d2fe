//! The fixture plan: one archive per checksum and compression option.
//!
//! The standard plan produces, from `test.txt`, in this order:
//!
//! | Output                    | Flags                   |
//! |---------------------------|-------------------------|
//! | `test.xar`                | none                    |
//! | `test-toc-sha256.xar`     | `--toc-cksum=sha256`    |
//! | `test-toc-sha512.xar`     | `--toc-cksum=sha512`    |
//! | `test-file-sha256.xar`    | `--file-cksum=sha256`   |
//! | `test-file-sha512.xar`    | `--file-cksum=sha512`   |
//! | `test-compress-lzma.xar`  | `--compression=lzma`    |
//! | `test-compress-bzip2.xar` | `--compression=bzip2`   |
//!
//! The LZMA fixture is disabled unless asked for: stock archiver builds on
//! macOS lack LZMA support.

use std::path::PathBuf;
use std::time::Duration;
use std::time::Instant;

use crate::XarError;
use crate::archiver::Archiver;
use crate::archiver::invocation::ArchiverOptions;
use crate::archiver::invocation::Invocation;
use crate::formats::ChecksumAlgorithm;
use crate::formats::Compression;

/// Default input file name.
pub const DEFAULT_INPUT: &str = "test.txt";

const LZMA_DISABLED: &str = "the stock archiver is built without LZMA support";

/// One fixture archive of the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureSpec {
    /// Output file name, e.g. `test-toc-sha256.xar`.
    pub name: String,
    /// Flags producing this fixture.
    pub options: ArchiverOptions,
    /// Whether the fixture is produced.
    pub enabled: bool,
    /// Why a disabled fixture is skipped.
    pub disabled_reason: Option<String>,
}

impl FixtureSpec {
    fn new(name: &str, options: ArchiverOptions) -> Self {
        Self {
            name: name.to_string(),
            options,
            enabled: true,
            disabled_reason: None,
        }
    }

    fn disabled(mut self, reason: &str) -> Self {
        self.enabled = false;
        self.disabled_reason = Some(reason.to_string());
        self
    }
}

/// Ordered list of fixtures to produce from one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixturePlan {
    /// Directory the archiver runs in and the archives are written to.
    pub dir: PathBuf,
    /// Input file, relative to `dir`.
    pub input: PathBuf,
    /// Fixtures in the order they are produced.
    pub fixtures: Vec<FixtureSpec>,
}

impl Default for FixturePlan {
    fn default() -> Self {
        Self::standard()
    }
}

impl FixturePlan {
    /// The standard seven-fixture plan in the current directory, LZMA
    /// disabled.
    #[must_use]
    pub fn standard() -> Self {
        let opts = ArchiverOptions::default;
        Self {
            dir: PathBuf::from("."),
            input: PathBuf::from(DEFAULT_INPUT),
            fixtures: vec![
                FixtureSpec::new("test.xar", opts()),
                FixtureSpec::new(
                    "test-toc-sha256.xar",
                    opts().with_toc_checksum(ChecksumAlgorithm::Sha256),
                ),
                FixtureSpec::new(
                    "test-toc-sha512.xar",
                    opts().with_toc_checksum(ChecksumAlgorithm::Sha512),
                ),
                FixtureSpec::new(
                    "test-file-sha256.xar",
                    opts().with_file_checksum(ChecksumAlgorithm::Sha256),
                ),
                FixtureSpec::new(
                    "test-file-sha512.xar",
                    opts().with_file_checksum(ChecksumAlgorithm::Sha512),
                ),
                FixtureSpec::new(
                    "test-compress-lzma.xar",
                    opts().with_compression(Compression::Lzma),
                )
                .disabled(LZMA_DISABLED),
                FixtureSpec::new(
                    "test-compress-bzip2.xar",
                    opts().with_compression(Compression::Bzip2),
                ),
            ],
        }
    }

    /// Sets the working and output directory.
    #[must_use]
    pub fn with_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.dir = dir.into();
        self
    }

    /// Sets the input file, relative to the directory.
    #[must_use]
    pub fn with_input<P: Into<PathBuf>>(mut self, input: P) -> Self {
        self.input = input.into();
        self
    }

    /// Enables or disables every fixture using LZMA compression.
    #[must_use]
    pub fn with_lzma(mut self, enabled: bool) -> Self {
        for spec in &mut self.fixtures {
            if spec.options.compression == Some(Compression::Lzma) {
                spec.enabled = enabled;
                spec.disabled_reason = (!enabled).then(|| LZMA_DISABLED.to_string());
            }
        }
        self
    }

    /// Returns the fixtures that will be produced.
    pub fn enabled(&self) -> impl Iterator<Item = &FixtureSpec> {
        self.fixtures.iter().filter(|f| f.enabled)
    }

    /// Builds the invocation for one fixture.
    #[must_use]
    pub fn invocation(&self, spec: &FixtureSpec) -> Invocation {
        Invocation::new(&spec.name, &self.input)
            .with_options(spec.options)
            .in_dir(&self.dir)
    }

    /// Returns the output path of one fixture.
    #[must_use]
    pub fn output_path(&self, spec: &FixtureSpec) -> PathBuf {
        self.dir.join(&spec.name)
    }
}

/// What happened to one fixture.
#[derive(Debug)]
pub enum InvocationOutcome {
    /// The archiver exited successfully.
    Created,
    /// The invocation failed; later fixtures were still attempted.
    Failed(XarError),
    /// The fixture is disabled in the plan.
    Skipped(String),
}

impl InvocationOutcome {
    /// Short label for display.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Failed(_) => "failed",
            Self::Skipped(_) => "skipped",
        }
    }
}

/// Outcome of one fixture.
#[derive(Debug)]
pub struct FixtureResult {
    /// Fixture name.
    pub name: String,
    /// Where the archive was (or would have been) written.
    pub output: PathBuf,
    /// Outcome.
    pub outcome: InvocationOutcome,
}

/// Outcome of running a whole plan.
#[derive(Debug, Default)]
pub struct FixtureReport {
    /// One result per fixture, in plan order, disabled ones included.
    pub results: Vec<FixtureResult>,
    /// Wall time of the run.
    pub duration: Duration,
}

impl FixtureReport {
    /// Number of archives created.
    #[must_use]
    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, InvocationOutcome::Created))
    }

    /// Number of failed invocations.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, InvocationOutcome::Failed(_)))
    }

    /// Number of disabled fixtures.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, InvocationOutcome::Skipped(_)))
    }

    /// Returns `true` if no invocation failed.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    /// Looks up the result for a fixture name.
    #[must_use]
    pub fn result(&self, name: &str) -> Option<&FixtureResult> {
        self.results.iter().find(|r| r.name == name)
    }

    fn count(&self, pred: impl Fn(&InvocationOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Runs every fixture of `plan` in order.
///
/// A failing invocation is recorded and logged, and the next one still runs;
/// the plan itself never fails. With `archiver` set to `None` (nothing was
/// found on `PATH`) every enabled fixture records `ArchiverNotFound`.
///
/// # Examples
///
/// ```no_run
/// use xarkit_core::archiver::Archiver;
/// use xarkit_core::archiver::FixturePlan;
/// use xarkit_core::archiver::run_plan;
///
/// let archiver = Archiver::locate().ok();
/// let report = run_plan(&FixturePlan::standard(), archiver.as_ref());
/// println!("{} created, {} failed", report.created(), report.failed());
/// ```
#[must_use]
pub fn run_plan(plan: &FixturePlan, archiver: Option<&Archiver>) -> FixtureReport {
    let start = Instant::now();
    let mut report = FixtureReport::default();

    if !plan.dir.join(&plan.input).exists() {
        log::warn!(
            "input {} does not exist; the archiver will likely fail",
            plan.dir.join(&plan.input).display()
        );
    }

    for spec in &plan.fixtures {
        let output = plan.output_path(spec);

        let outcome = if spec.enabled {
            let result = match archiver {
                Some(archiver) => archiver.run(&plan.invocation(spec)),
                None => Err(XarError::ArchiverNotFound(
                    crate::archiver::DEFAULT_ARCHIVER.to_string(),
                )),
            };
            match result {
                Ok(()) => InvocationOutcome::Created,
                Err(e) => {
                    log::warn!("{}: {e}", spec.name);
                    InvocationOutcome::Failed(e)
                }
            }
        } else {
            let reason = spec
                .disabled_reason
                .clone()
                .unwrap_or_else(|| "disabled".to_string());
            log::debug!("skipping {}: {reason}", spec.name);
            InvocationOutcome::Skipped(reason)
        };

        report.results.push(FixtureResult {
            name: spec.name.clone(),
            output,
            outcome,
        });
    }

    report.duration = start.elapsed();
    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_plan_order() {
        let plan = FixturePlan::standard();
        let names: Vec<&str> = plan.fixtures.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "test.xar",
                "test-toc-sha256.xar",
                "test-toc-sha512.xar",
                "test-file-sha256.xar",
                "test-file-sha512.xar",
                "test-compress-lzma.xar",
                "test-compress-bzip2.xar",
            ]
        );
        assert_eq!(plan.enabled().count(), 6);
        assert!(!plan.fixtures[5].enabled);
        assert!(plan.fixtures[5].disabled_reason.is_some());
    }

    #[test]
    fn test_names_encode_options() {
        for spec in &FixturePlan::standard().fixtures {
            let o = spec.options;
            let expected = match (o.toc_checksum, o.file_checksum, o.compression) {
                (None, None, None) => "test.xar".to_string(),
                (Some(a), None, None) => format!("test-toc-{a}.xar"),
                (None, Some(a), None) => format!("test-file-{a}.xar"),
                (None, None, Some(c)) => format!("test-compress-{c}.xar"),
                _ => panic!("fixture {} combines options", spec.name),
            };
            assert_eq!(spec.name, expected);
        }
    }

    #[test]
    fn test_with_lzma() {
        let plan = FixturePlan::standard().with_lzma(true);
        assert_eq!(plan.enabled().count(), 7);
        let plan = plan.with_lzma(false);
        assert_eq!(plan.enabled().count(), 6);
    }

    #[test]
    fn test_invocation_for_fixture() {
        let plan = FixturePlan::standard()
            .with_dir("/fixtures")
            .with_input("input.txt");
        let inv = plan.invocation(&plan.fixtures[1]);
        assert_eq!(inv.output, PathBuf::from("test-toc-sha256.xar"));
        assert_eq!(inv.inputs, vec![PathBuf::from("input.txt")]);
        assert_eq!(inv.output_path(), PathBuf::from("/fixtures/test-toc-sha256.xar"));
        assert_eq!(inv.options.toc_checksum, Some(ChecksumAlgorithm::Sha256));
    }

    #[test]
    fn test_run_without_archiver_continues() {
        let temp = tempfile::TempDir::new().unwrap();
        let plan = FixturePlan::standard().with_dir(temp.path());
        let report = run_plan(&plan, None);

        assert_eq!(report.results.len(), 7);
        assert_eq!(report.failed(), 6);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.created(), 0);
        assert!(!report.all_succeeded());
        assert!(matches!(
            report.result("test-compress-bzip2.xar").unwrap().outcome,
            InvocationOutcome::Failed(XarError::ArchiverNotFound(_))
        ));
    }
}
