//! Post-install verification.
//!
//! Runs `<final_path> version --client` and records how it ended. The
//! outcome is reported to the caller but never fails the install.

use camino::Utf8Path;
use log::{debug, warn};
use serde::Serialize;
use std::io::{self, Read};
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::Duration;
use wait_timeout::ChildExt;

/// Arguments passed to the installed binary for verification.
pub const VERIFY_ARGS: [&str; 2] = ["version", "--client"];

/// How a command run by a [`CommandExecutor`] ended.
#[derive(Debug)]
pub enum CommandOutcome {
    /// The process exited (normally or by signal) within the timeout.
    Completed(Output),
    /// The process was killed after exceeding the timeout.
    TimedOut,
}

/// Abstraction for running external commands.
pub trait CommandExecutor {
    /// Run `program` with `args`, waiting at most `timeout`.
    ///
    /// # Errors
    ///
    /// Returns any I/O errors encountered while spawning or waiting for the
    /// command.
    fn run(
        &self,
        program: &Utf8Path,
        args: &[&str],
        timeout: Duration,
    ) -> io::Result<CommandOutcome>;
}

/// Executes commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(
        &self,
        program: &Utf8Path,
        args: &[&str],
        timeout: Duration,
    ) -> io::Result<CommandOutcome> {
        let mut child = Command::new(program.as_std_path())
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        // Drain stdout while waiting so a full pipe cannot stall the child.
        let stdout_reader = child.stdout.take().map(|mut stdout| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                stdout.read_to_end(&mut buf).map(|_| buf)
            })
        });

        match child.wait_timeout(timeout)? {
            Some(status) => {
                let stdout = match stdout_reader {
                    Some(reader) => reader
                        .join()
                        .map_err(|_| io::Error::other("stdout reader panicked"))??,
                    None => Vec::new(),
                };
                Ok(CommandOutcome::Completed(Output {
                    status,
                    stdout,
                    stderr: Vec::new(),
                }))
            }
            None => {
                if let Err(e) = child.kill() {
                    debug!("failed to kill timed-out {program}: {e}");
                }
                if let Err(e) = child.wait() {
                    debug!("failed to reap timed-out {program}: {e}");
                }
                Ok(CommandOutcome::TimedOut)
            }
        }
    }
}

/// Result of running the installed binary's version query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VerificationStatus {
    /// The binary exited with `code`.
    Exited {
        /// Process exit code.
        code: i32,
    },
    /// The binary ended without an exit code (e.g. killed by a signal).
    Terminated,
    /// The binary did not finish within the verification timeout.
    TimedOut {
        /// The timeout that elapsed, in seconds.
        after_secs: u64,
    },
    /// The binary could not be run at all.
    Unavailable {
        /// Description of the spawn or wait failure.
        reason: String,
    },
}

impl VerificationStatus {
    /// Return `true` only for a zero exit code.
    ///
    /// # Examples
    ///
    /// ```
    /// use kubectl_installer::verify::VerificationStatus;
    ///
    /// assert!(VerificationStatus::Exited { code: 0 }.is_success());
    /// assert!(!VerificationStatus::Exited { code: 1 }.is_success());
    /// assert!(!VerificationStatus::Terminated.is_success());
    /// ```
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Exited { code: 0 })
    }
}

/// Run `<binary> version --client` and classify the outcome.
///
/// Never fails: spawn errors, timeouts, and non-zero exits are all reported
/// through [`VerificationStatus`].
#[must_use]
pub fn verify_install(
    executor: &dyn CommandExecutor,
    binary: &Utf8Path,
    timeout: Duration,
) -> VerificationStatus {
    let status = match executor.run(binary, &VERIFY_ARGS, timeout) {
        Ok(CommandOutcome::Completed(output)) => {
            debug!(
                "{binary} {} stdout: {}",
                VERIFY_ARGS.join(" "),
                String::from_utf8_lossy(&output.stdout).trim()
            );
            output
                .status
                .code()
                .map_or(VerificationStatus::Terminated, |code| {
                    VerificationStatus::Exited { code }
                })
        }
        Ok(CommandOutcome::TimedOut) => VerificationStatus::TimedOut {
            after_secs: timeout.as_secs(),
        },
        Err(e) => VerificationStatus::Unavailable {
            reason: e.to_string(),
        },
    };

    if !status.is_success() {
        warn!("verification of {binary} did not succeed: {status:?}");
    }
    status
}
