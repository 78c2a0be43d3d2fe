//! Fixtures command implementation.

use crate::cli::FixturesArgs;
use crate::error::convert_archiver_error;
use crate::output::OutputFormatter;
use anyhow::Result;
use anyhow::bail;
use xarkit_core::Archiver;
use xarkit_core::FixturePlan;
use xarkit_core::archiver::run_plan;

pub fn execute(args: &FixturesArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let archiver = match Archiver::resolve(args.archiver.as_deref()) {
        Ok(archiver) => Some(archiver),
        Err(e) => {
            // Every invocation is still attempted and recorded as failed.
            formatter.format_warning(&format!("{:#}", convert_archiver_error(e)));
            None
        }
    };

    let plan = FixturePlan::standard()
        .with_dir(&args.dir)
        .with_input(&args.input)
        .with_lzma(args.with_lzma);

    let report = run_plan(&plan, archiver.as_ref());
    formatter.format_fixture_report(&report)?;

    if args.strict && !report.all_succeeded() {
        bail!(
            "{} of {} fixture invocations failed",
            report.failed(),
            report.results.len() - report.skipped()
        );
    }

    Ok(())
}
