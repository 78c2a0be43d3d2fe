//! Example: producing and inspecting the fixture archives
//!
//! Run with: `cargo run --example generate_fixtures`
//!
//! Needs `xar` on `PATH`. Writes the fixtures to a scratch directory.

use xarkit_core::InvocationOutcome;
use xarkit_core::generate_fixtures;
use xarkit_core::inspect_archive;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = std::env::temp_dir().join("xarkit-fixtures");
    std::fs::create_dir_all(&dir)?;
    std::fs::write(dir.join("test.txt"), "Hello, xar!\n")?;

    let report = generate_fixtures(&dir);
    println!(
        "{} created, {} failed, {} skipped in {:?}",
        report.created(),
        report.failed(),
        report.skipped(),
        report.duration
    );

    for result in &report.results {
        match &result.outcome {
            InvocationOutcome::Created => {
                let inspection = inspect_archive(&result.output)?;
                println!(
                    "  {:<26} toc={:<7} file={:<7} encodings={:?}",
                    result.name,
                    inspection.toc_checksum.as_deref().unwrap_or("-"),
                    inspection.file_checksum().unwrap_or("-"),
                    inspection.encodings
                );
            }
            InvocationOutcome::Failed(e) => println!("  {:<26} failed: {e}", result.name),
            InvocationOutcome::Skipped(reason) => {
                println!("  {:<26} skipped: {reason}", result.name);
            }
        }
    }

    Ok(())
}
