//! Verify command implementation

use crate::cli::VerifyArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use anyhow::bail;
use xarkit_core::VerificationStatus;
use xarkit_core::verify_archive;

pub fn execute(args: &VerifyArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let report = add_archive_context(verify_archive(&args.archive), &args.archive)?;

    formatter.format_verification_report(&report)?;

    match report.status {
        // Unsupported checksums or encodings are not proof of damage.
        VerificationStatus::Pass | VerificationStatus::Warning => Ok(()),
        VerificationStatus::Fail => {
            bail!("Archive verification failed: {}", args.archive.display())
        }
    }
}
