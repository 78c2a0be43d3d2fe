//! High-level public API for producing archives with the external archiver.

use std::path::Path;
use std::path::PathBuf;

use crate::Result;
use crate::XarError;
use crate::archiver::Archiver;
use crate::archiver::ArchiverOptions;
use crate::archiver::FixturePlan;
use crate::archiver::FixtureReport;
use crate::archiver::Invocation;
use crate::archiver::run_plan;

/// Creates `output_path` from `sources` with the archiver found on `PATH`.
///
/// The archive is written by the external `xar` program; this function only
/// builds the argument list and checks the exit status.
///
/// # Errors
///
/// Returns an error if:
/// - No sources are given
/// - The archiver is not installed
/// - The archiver exits with a non-zero status
///
/// # Examples
///
/// ```no_run
/// use xarkit_core::ArchiverOptions;
/// use xarkit_core::create_archive;
/// use xarkit_core::formats::ChecksumAlgorithm;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let options = ArchiverOptions::default().with_toc_checksum(ChecksumAlgorithm::Sha256);
/// create_archive("test-toc-sha256.xar", &["test.txt"], &options)?;
/// # Ok(())
/// # }
/// ```
pub fn create_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    output_path: P,
    sources: &[Q],
    options: &ArchiverOptions,
) -> Result<()> {
    let archiver = Archiver::locate()?;
    create_archive_with(&archiver, output_path, sources, options)
}

/// Creates `output_path` from `sources` with an already resolved archiver.
///
/// # Errors
///
/// Same as [`create_archive`], minus archiver lookup.
pub fn create_archive_with<P: AsRef<Path>, Q: AsRef<Path>>(
    archiver: &Archiver,
    output_path: P,
    sources: &[Q],
    options: &ArchiverOptions,
) -> Result<()> {
    let invocation = build_invocation(output_path.as_ref(), sources, *options)?;
    archiver.run(&invocation)
}

/// Produces the standard fixture set in `dir` from `dir/test.txt`.
///
/// Never fails: every invocation outcome is in the returned report, and a
/// missing archiver shows up as one failure per fixture.
pub fn generate_fixtures<P: AsRef<Path>>(dir: P) -> FixtureReport {
    let archiver = match Archiver::locate() {
        Ok(archiver) => Some(archiver),
        Err(e) => {
            log::warn!("{e}");
            None
        }
    };
    run_plan(
        &FixturePlan::standard().with_dir(dir.as_ref()),
        archiver.as_ref(),
    )
}

fn build_invocation<Q: AsRef<Path>>(
    output: &Path,
    sources: &[Q],
    options: ArchiverOptions,
) -> Result<Invocation> {
    let mut inputs = sources.iter().map(|s| PathBuf::from(s.as_ref()));
    let first = inputs
        .next()
        .ok_or_else(|| XarError::InvalidConfig("no input files given".into()))?;

    let invocation = inputs.fold(Invocation::new(output, first), Invocation::with_input);
    Ok(invocation.with_options(options))
}
