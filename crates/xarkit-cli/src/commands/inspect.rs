//! Inspect command implementation

use crate::cli::InspectArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use xarkit_core::XarArchive;
use xarkit_core::inspection::inspect::inspect;

pub fn execute(args: &InspectArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let archive = add_archive_context(XarArchive::open(&args.archive), &args.archive)?;
    let inspection = inspect(&archive);

    let toc_xml = args.toc.then(|| archive.toc().xml());
    formatter.format_inspection(&args.archive, &inspection, toc_xml)
}
