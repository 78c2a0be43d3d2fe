//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Context;
use anyhow::Result;
use std::env;
use xarkit_core::ExtractConfig;
use xarkit_core::NoopProgress;
use xarkit_core::extract_archive_with_progress;

pub fn execute(args: &ExtractArgs, formatter: &dyn OutputFormatter, quiet: bool) -> Result<()> {
    let output_dir = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("failed to get current directory")?,
    };

    let config = build_config(args);

    // Use progress bar if TTY is detected and output is not suppressed
    let report = if !quiet && CliProgress::should_show() {
        let mut progress = CliProgress::new("Extracting");
        add_archive_context(
            extract_archive_with_progress(&args.archive, &output_dir, &config, &mut progress),
            &args.archive,
        )?
    } else {
        let mut noop = NoopProgress;
        add_archive_context(
            extract_archive_with_progress(&args.archive, &output_dir, &config, &mut noop),
            &args.archive,
        )?
    };

    formatter.format_extraction_result(&report)
}

fn build_config(args: &ExtractArgs) -> ExtractConfig {
    let defaults = ExtractConfig::default();
    ExtractConfig::default()
        .with_max_file_count(args.max_files)
        .with_max_file_size(args.max_file_size.unwrap_or(defaults.max_file_size))
        .with_max_total_size(args.max_total_size.unwrap_or(defaults.max_total_size))
        .with_verify_checksums(!args.no_verify)
        .with_allow_symlinks(args.allow_symlinks)
        .with_preserve_permissions(args.preserve_permissions)
        .with_preserve_ownership(args.preserve_ownership)
        .with_preserve_times(!args.no_times)
}
