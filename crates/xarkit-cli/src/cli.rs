//! CLI argument parsing using clap.

use clap::ArgAction;
use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;
use xarkit_core::formats::ChecksumAlgorithm;
use xarkit_core::formats::Compression;

#[derive(Parser)]
#[command(name = "xarkit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

impl Cli {
    /// Log filter derived from `-v` and `-q`.
    pub const fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "error",
            (false, 0) => "warn",
            (false, 1) => "info",
            (false, 2) => "debug",
            (false, _) => "trace",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Produce the standard fixture archives with the xar archiver
    Fixtures(FixturesArgs),
    /// Create an archive with the xar archiver
    Create(CreateArgs),
    /// List archive contents without extraction
    List(ListArgs),
    /// Show the checksum and encoding choices stored in an archive
    Inspect(InspectArgs),
    /// Verify table of contents and member checksums
    Verify(VerifyArgs),
    /// Extract archive contents
    Extract(ExtractArgs),
    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args)]
pub struct FixturesArgs {
    /// Directory to run the archiver in and write fixtures to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Input file, relative to the directory
    #[arg(short, long, value_name = "FILE", default_value = "test.txt")]
    pub input: PathBuf,

    /// Archiver executable (default: xar on PATH)
    #[arg(long, value_name = "PATH")]
    pub archiver: Option<PathBuf>,

    /// Also produce the LZMA fixture
    #[arg(long)]
    pub with_lzma: bool,

    /// Exit with an error if any invocation fails
    #[arg(long)]
    pub strict: bool,
}

#[derive(clap::Args)]
pub struct CreateArgs {
    /// Output archive file path
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Source files or directories to archive
    #[arg(value_name = "SOURCE", required = true)]
    pub sources: Vec<PathBuf>,

    /// Table of contents checksum (sha1, md5, sha256, sha512, none)
    #[arg(long = "toc-cksum", value_name = "ALGO", value_parser = parse_checksum)]
    pub toc_checksum: Option<ChecksumAlgorithm>,

    /// Per-file checksum (sha1, md5, sha256, sha512, none)
    #[arg(long = "file-cksum", value_name = "ALGO", value_parser = parse_checksum)]
    pub file_checksum: Option<ChecksumAlgorithm>,

    /// Member compression (gzip, bzip2, lzma, xz, none)
    #[arg(long, value_name = "ALGO", value_parser = parse_compression)]
    pub compression: Option<Compression>,

    /// Archiver executable (default: xar on PATH)
    #[arg(long, value_name = "PATH")]
    pub archiver: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Show detailed file information
    #[arg(short, long)]
    pub long: bool,

    /// Show sizes in human-readable format
    #[arg(short = 'H', long)]
    pub human_readable: bool,
}

#[derive(clap::Args)]
pub struct InspectArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Print the table of contents XML
    #[arg(long)]
    pub toc: bool,
}

#[derive(clap::Args)]
pub struct VerifyArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,
}

#[derive(clap::Args)]
pub struct ExtractArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Output directory (default: current directory)
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Skip checksum verification of member data
    #[arg(long)]
    pub no_verify: bool,

    /// Allow symlinks (within extraction directory)
    #[arg(long)]
    pub allow_symlinks: bool,

    /// Preserve file permissions from archive
    #[arg(long)]
    pub preserve_permissions: bool,

    /// Preserve file ownership from archive (usually needs root)
    #[arg(long)]
    pub preserve_ownership: bool,

    /// Do not restore access and modification times
    #[arg(long)]
    pub no_times: bool,

    /// Maximum number of entries to extract
    #[arg(long, default_value = "10000")]
    pub max_files: usize,

    /// Maximum single file size in bytes
    #[arg(long, value_parser = parse_byte_size)]
    pub max_file_size: Option<u64>,

    /// Maximum total extracted size in bytes
    #[arg(long, value_parser = parse_byte_size)]
    pub max_total_size: Option<u64>,
}

fn parse_checksum(s: &str) -> Result<ChecksumAlgorithm, String> {
    s.parse::<ChecksumAlgorithm>().map_err(|e| e.to_string())
}

fn parse_compression(s: &str) -> Result<Compression, String> {
    s.parse::<Compression>().map_err(|e| e.to_string())
}

/// Parse byte size with optional suffix (K, M, G, T)
#[allow(clippy::option_if_let_else)]
fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty byte size".to_string());
    }

    let (num_str, multiplier) = if let Some(stripped) = s.strip_suffix('T') {
        (stripped, 1024_u64.pow(4))
    } else if let Some(stripped) = s.strip_suffix('G') {
        (stripped, 1024_u64.pow(3))
    } else if let Some(stripped) = s.strip_suffix('M') {
        (stripped, 1024_u64.pow(2))
    } else if let Some(stripped) = s.strip_suffix('K') {
        (stripped, 1024)
    } else {
        (s, 1)
    };

    num_str
        .parse::<u64>()
        .map_err(|_| format!("invalid byte size: {s}"))
        .and_then(|n| {
            n.checked_mul(multiplier)
                .ok_or_else(|| format!("byte size overflow: {s}"))
        })
}
