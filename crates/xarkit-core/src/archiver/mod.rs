//! Driving the external `xar` archiver.
//!
//! Archive creation is delegated to the archiver binary; this module resolves
//! it once and runs it with argv-style arguments, never through a shell.

pub mod fixtures;
pub mod invocation;

use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Stdio;

use crate::Result;
use crate::XarError;

pub use fixtures::FixturePlan;
pub use fixtures::FixtureReport;
pub use fixtures::FixtureResult;
pub use fixtures::FixtureSpec;
pub use fixtures::InvocationOutcome;
pub use fixtures::run_plan;
pub use invocation::ArchiverOptions;
pub use invocation::Invocation;

/// Program name searched for on `PATH`.
pub const DEFAULT_ARCHIVER: &str = "xar";

/// Handle on a resolved archiver executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archiver {
    program: PathBuf,
}

impl Archiver {
    /// Finds `xar` on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns `XarError::ArchiverNotFound` if it is not installed.
    pub fn locate() -> Result<Self> {
        Self::locate_named(DEFAULT_ARCHIVER)
    }

    /// Finds an archiver by program name on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns `XarError::ArchiverNotFound` if no such program exists.
    pub fn locate_named(name: &str) -> Result<Self> {
        let program = which::which(name)
            .map_err(|e| XarError::ArchiverNotFound(format!("{name}: {e}")))?;
        log::debug!("using archiver {}", program.display());
        Ok(Self { program })
    }

    /// Uses the archiver at an explicit path, without checking it exists.
    pub fn at<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolves `explicit` if given, otherwise searches `PATH`.
    ///
    /// # Errors
    ///
    /// Returns `XarError::ArchiverNotFound` when `explicit` is `None` and
    /// nothing is found.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Ok(Self::at(path)),
            None => Self::locate(),
        }
    }

    /// Returns the executable path.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Builds the process command for `invocation` without running it.
    #[must_use]
    pub fn command(&self, invocation: &Invocation) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(invocation.args());
        if let Some(dir) = invocation.working_dir() {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Runs `invocation` and waits for the archiver to exit.
    ///
    /// The archiver's stdout goes straight to ours. Its stderr is captured:
    /// on success it is passed through to our stderr, on failure it becomes
    /// part of the `ArchiverFailed` status.
    ///
    /// # Errors
    ///
    /// Returns `XarError::ArchiverNotFound` if the program cannot be
    /// spawned because it does not exist, `XarError::ArchiverFailed` for a
    /// non-zero exit, and `XarError::Io` for other spawn failures.
    pub fn run(&self, invocation: &Invocation) -> Result<()> {
        let output_path = invocation.output_path();
        log::info!(
            "creating {} ({})",
            output_path.display(),
            describe_flags(invocation)
        );
        log::debug!("{} {:?}", self.program.display(), invocation.args());

        let output = self
            .command(invocation)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    XarError::ArchiverNotFound(self.program.display().to_string())
                } else {
                    XarError::Io(e)
                }
            })?;

        if output.status.success() {
            if !output.stderr.is_empty() {
                std::io::stderr().write_all(&output.stderr)?;
            }
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        let status = if stderr.is_empty() {
            output.status.to_string()
        } else {
            format!("{}: {stderr}", output.status)
        };
        Err(XarError::ArchiverFailed {
            output: output_path,
            status,
        })
    }
}

fn describe_flags(invocation: &Invocation) -> String {
    let flags = invocation.options.flags();
    if flags.is_empty() {
        "default options".to_string()
    } else {
        flags.join(" ")
    }
}
