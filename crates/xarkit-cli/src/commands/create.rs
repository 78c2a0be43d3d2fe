//! Create command implementation.

use crate::cli::CreateArgs;
use crate::error::convert_archiver_error;
use crate::output::OutputFormatter;
use anyhow::Result;
use xarkit_core::Archiver;
use xarkit_core::ArchiverOptions;
use xarkit_core::create_archive_with;

pub fn execute(args: &CreateArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let archiver = Archiver::resolve(args.archiver.as_deref()).map_err(convert_archiver_error)?;

    let mut options = ArchiverOptions::default();
    if let Some(alg) = args.toc_checksum {
        options = options.with_toc_checksum(alg);
    }
    if let Some(alg) = args.file_checksum {
        options = options.with_file_checksum(alg);
    }
    if let Some(compression) = args.compression {
        options = options.with_compression(compression);
    }

    create_archive_with(&archiver, &args.output, &args.sources, &options)
        .map_err(convert_archiver_error)?;

    formatter.format_creation_result(&args.output)
}
