//! Shared test utilities for the installer crate.

use crate::host::HostEnvironment;
use crate::verify::{CommandExecutor, CommandOutcome};
use camino::{Utf8Path, Utf8PathBuf};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::process::{ExitStatus, Output};
use std::time::Duration;

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code as u32)
}

/// Creates a completed command outcome with the given exit code.
pub fn completed_with(code: i32) -> io::Result<CommandOutcome> {
    Ok(CommandOutcome::Completed(Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: Vec::new(),
    }))
}

/// Represents an expected command invocation for testing.
#[derive(Debug)]
pub struct ExpectedCall {
    /// The program to execute.
    pub program: Utf8PathBuf,
    /// The arguments to pass to the program.
    pub args: Vec<&'static str>,
    /// The result to return when this command is invoked.
    pub result: io::Result<CommandOutcome>,
}

/// A stub implementation of `CommandExecutor` for testing.
///
/// Records expected command invocations and returns predefined results,
/// allowing tests to verify command execution without side effects.
#[derive(Debug)]
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
}

impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    #[must_use]
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
        }
    }

    /// Creates a `StubExecutor` that must never be invoked.
    #[must_use]
    pub fn unused() -> Self {
        Self::new(Vec::new())
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        assert!(
            self.expected.borrow().is_empty(),
            "expected no further command invocations"
        );
    }
}

impl CommandExecutor for StubExecutor {
    fn run(
        &self,
        program: &Utf8Path,
        args: &[&str],
        _timeout: Duration,
    ) -> io::Result<CommandOutcome> {
        let mut expected = self.expected.borrow_mut();
        let call = expected.pop_front().expect("unexpected command invocation");

        assert_eq!(call.program.as_path(), program);
        assert_eq!(call.args.as_slice(), args);

        call.result
    }
}

/// A host with a fixed OS family and effective uid.
#[derive(Debug, Clone)]
pub struct StubHost {
    /// OS family to report.
    pub os: String,
    /// Effective uid to report.
    pub uid: Option<u32>,
}

impl StubHost {
    /// A Linux host running as root.
    #[must_use]
    pub fn linux_root() -> Self {
        Self {
            os: "linux".to_owned(),
            uid: Some(0),
        }
    }

    /// A host with the given OS family and uid.
    #[must_use]
    pub fn new(os: &str, uid: Option<u32>) -> Self {
        Self {
            os: os.to_owned(),
            uid,
        }
    }
}

impl HostEnvironment for StubHost {
    fn os_family(&self) -> String {
        self.os.clone()
    }

    fn effective_uid(&self) -> Option<u32> {
        self.uid
    }
}

/// Creates a temporary directory and returns it with its UTF-8 path.
///
/// # Panics
///
/// Panics if the directory cannot be created or its path is not UTF-8.
#[must_use]
pub fn temp_dir() -> (tempfile::TempDir, Utf8PathBuf) {
    let temp = tempfile::tempdir().expect("failed to create temp dir");
    let path =
        Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("temp dir path not UTF-8");
    (temp, path)
}

/// Writes `contents` to `dir/name` and returns the path.
///
/// # Panics
///
/// Panics if the file cannot be written.
#[must_use]
pub fn write_file(dir: &Utf8Path, name: &str, contents: &[u8]) -> Utf8PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("failed to write test file");
    path
}
