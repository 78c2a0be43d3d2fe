//! Archiver invocations and their option flags.

use std::ffi::OsString;
use std::path::Path;
use std::path::PathBuf;

use crate::formats::ChecksumAlgorithm;
use crate::formats::Compression;

/// Checksum and compression flags passed to the archiver.
///
/// `None` leaves the archiver's own default in place (sha1 checksums, gzip
/// compression for the stock `xar`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiverOptions {
    /// `--toc-cksum=<algo>`.
    pub toc_checksum: Option<ChecksumAlgorithm>,
    /// `--file-cksum=<algo>`.
    pub file_checksum: Option<ChecksumAlgorithm>,
    /// `--compression=<algo>`.
    pub compression: Option<Compression>,
}

impl ArchiverOptions {
    /// Sets the TOC checksum algorithm.
    #[must_use]
    pub const fn with_toc_checksum(mut self, algorithm: ChecksumAlgorithm) -> Self {
        self.toc_checksum = Some(algorithm);
        self
    }

    /// Sets the per-file checksum algorithm.
    #[must_use]
    pub const fn with_file_checksum(mut self, algorithm: ChecksumAlgorithm) -> Self {
        self.file_checksum = Some(algorithm);
        self
    }

    /// Sets the member compression.
    #[must_use]
    pub const fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = Some(compression);
        self
    }

    /// Returns the option flags in the order the archiver receives them.
    #[must_use]
    pub fn flags(&self) -> Vec<String> {
        let mut flags = Vec::new();
        if let Some(alg) = self.toc_checksum {
            flags.push(format!("--toc-cksum={alg}"));
        }
        if let Some(alg) = self.file_checksum {
            flags.push(format!("--file-cksum={alg}"));
        }
        if let Some(compression) = self.compression {
            flags.push(format!("--compression={compression}"));
        }
        flags
    }
}

/// One archiver run: create `output` from `inputs` with `options`.
///
/// `output` and `inputs` are passed verbatim. The archiver records input
/// paths as given, so relative inputs together with a `working_dir` keep
/// absolute directory prefixes out of the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Archive to create.
    pub output: PathBuf,
    /// Files or directories to add.
    pub inputs: Vec<PathBuf>,
    /// Checksum and compression flags.
    pub options: ArchiverOptions,
    /// Directory the archiver runs in; the caller's when `None`.
    pub working_dir: Option<PathBuf>,
}

impl Invocation {
    /// Creates an invocation with default options.
    pub fn new<P: Into<PathBuf>, I: Into<PathBuf>>(output: P, input: I) -> Self {
        Self {
            output: output.into(),
            inputs: vec![input.into()],
            options: ArchiverOptions::default(),
            working_dir: None,
        }
    }

    /// Adds another input path.
    #[must_use]
    pub fn with_input<P: Into<PathBuf>>(mut self, input: P) -> Self {
        self.inputs.push(input.into());
        self
    }

    /// Replaces the option flags.
    #[must_use]
    pub const fn with_options(mut self, options: ArchiverOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs the archiver in `dir`.
    #[must_use]
    pub fn in_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Builds the argument vector: `-c -f <output> [flags...] <inputs...>`.
    #[must_use]
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-c".into(), "-f".into(), self.output.clone().into()];
        args.extend(self.options.flags().into_iter().map(OsString::from));
        args.extend(self.inputs.iter().map(|p| p.clone().into_os_string()));
        args
    }

    /// Returns where the archive will be written, resolved against the
    /// working directory.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        match &self.working_dir {
            Some(dir) if self.output.is_relative() => dir.join(&self.output),
            _ => self.output.clone(),
        }
    }

    /// Returns the working directory, if one is set.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }
}
