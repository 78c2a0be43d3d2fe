//! xarkit CLI - produce XAR fixture archives with the xar archiver and
//! inspect, verify and extract XAR archives.

mod cli;
mod commands;
mod error;
mod output;
mod progress;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .format_timestamp(None)
        .init();

    let formatter = output::create_formatter(cli.json, cli.verbose > 0, cli.quiet);

    match run(&cli, &*formatter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("command failed: {e:?}");
            formatter.format_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &cli::Cli, formatter: &dyn output::OutputFormatter) -> Result<()> {
    match &cli.command {
        cli::Commands::Fixtures(args) => commands::fixtures::execute(args, formatter),
        cli::Commands::Create(args) => commands::create::execute(args, formatter),
        cli::Commands::List(args) => commands::list::execute(args, formatter),
        cli::Commands::Inspect(args) => commands::inspect::execute(args, formatter),
        cli::Commands::Verify(args) => commands::verify::execute(args, formatter),
        cli::Commands::Extract(args) => commands::extract::execute(args, formatter, cli.quiet),
        cli::Commands::Completion { shell } => {
            commands::completion::execute(*shell);
            Ok(())
        }
    }
}
