//! Host identification for the precondition check.
//!
//! The installer writes into a system binary directory, so it only proceeds
//! on Linux under the root account. Reading the host is abstracted behind
//! [`HostEnvironment`] so tests can exercise both outcomes without privilege.

use crate::error::{InstallerError, Result};

/// Operating system family the installer supports.
pub const REQUIRED_OS: &str = "linux";

/// Effective user identifier of the superuser.
pub const REQUIRED_UID: u32 = 0;

/// Source of the OS family and effective user identifier.
#[cfg_attr(test, mockall::automock)]
pub trait HostEnvironment {
    /// Return the operating system family (e.g. `linux`, `macos`).
    fn os_family(&self) -> String;

    /// Return the effective user identifier, or `None` when the platform has
    /// no such concept.
    fn effective_uid(&self) -> Option<u32>;
}

/// Reads identification from the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl HostEnvironment for SystemHost {
    fn os_family(&self) -> String {
        std::env::consts::OS.to_owned()
    }

    #[cfg(unix)]
    fn effective_uid(&self) -> Option<u32> {
        // SAFETY: geteuid has no preconditions and cannot fail.
        Some(unsafe { libc::geteuid() })
    }

    #[cfg(not(unix))]
    fn effective_uid(&self) -> Option<u32> {
        None
    }
}

/// The host values observed by a successful precondition check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdentity {
    /// Detected operating system family.
    pub os: String,
    /// Detected effective user identifier.
    pub uid: u32,
}

/// Confirm the host is Linux and the process runs as root.
///
/// Only the two host queries are made; nothing else is touched.
///
/// # Errors
///
/// Returns [`InstallerError::Precondition`] with the detected and required
/// values when either check fails.
pub fn check_preconditions(host: &dyn HostEnvironment) -> Result<HostIdentity> {
    let os = host.os_family();
    let uid = host.effective_uid();

    match uid {
        Some(uid) if os == REQUIRED_OS && uid == REQUIRED_UID => Ok(HostIdentity { os, uid }),
        _ => Err(InstallerError::Precondition {
            detected_os: os,
            detected_uid: uid,
            required_os: REQUIRED_OS,
            required_uid: REQUIRED_UID,
        }),
    }
}
