//! Error types for the kubectl installer.
//!
//! Each installation step has exactly one error variant. Every variant is
//! terminal: the installer never retries and never rolls back, so the error
//! carries enough detail for the user to act on it.

use crate::installer::InstallStep;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur during the installation process.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// The host is not a Linux system or the installer is not running as root.
    #[error(
        "unsupported host: detected os={detected_os} uid={}, required os={required_os} uid={required_uid}",
        display_uid(.detected_uid)
    )]
    Precondition {
        /// Operating system family reported by the host.
        detected_os: String,
        /// Effective user identifier, when the platform exposes one.
        detected_uid: Option<u32>,
        /// Operating system family the installer requires.
        required_os: &'static str,
        /// Effective user identifier the installer requires.
        required_uid: u32,
    },

    /// The latest stable version could not be resolved.
    #[error("failed to resolve latest kubectl version from {url}: {reason}")]
    VersionResolution {
        /// The version endpoint that was queried.
        url: String,
        /// Description of the failure.
        reason: String,
    },

    /// The kubectl binary could not be downloaded.
    #[error("failed to download kubectl from {url}: {reason}")]
    Download {
        /// The binary URL that was requested.
        url: String,
        /// Description of the failure.
        reason: String,
    },

    /// The downloaded binary could not be marked executable.
    #[error("failed to make {path} executable")]
    Permission {
        /// Path whose mode could not be changed.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The downloaded binary could not be moved into place.
    #[error("failed to move {from} to {to}")]
    Relocation {
        /// Staging path of the downloaded binary.
        from: Utf8PathBuf,
        /// Final install path.
        to: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An interrupt signal arrived before a filesystem-changing step.
    #[error("interrupted before {step}")]
    Interrupted {
        /// The step that was about to run.
        step: InstallStep,
    },

    /// The install report could not be encoded as JSON.
    #[error("failed to encode install report")]
    ReportEncoding(#[from] serde_json::Error),

    /// Failed to write output.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },
}

impl InstallerError {
    /// Return the installation step this error belongs to, if any.
    ///
    /// Output errors happen after the install finished and map to `None`.
    #[must_use]
    pub fn step(&self) -> Option<InstallStep> {
        match self {
            Self::Precondition { .. } => Some(InstallStep::Precondition),
            Self::VersionResolution { .. } => Some(InstallStep::ResolveVersion),
            Self::Download { .. } => Some(InstallStep::Download),
            Self::Permission { .. } => Some(InstallStep::MakeExecutable),
            Self::Relocation { .. } => Some(InstallStep::Relocate),
            Self::Interrupted { step } => Some(*step),
            Self::ReportEncoding(_) | Self::WriteFailed { .. } => None,
        }
    }
}

fn display_uid(uid: &Option<u32>) -> String {
    uid.map_or_else(|| "unknown".to_owned(), |uid| uid.to_string())
}

/// Result type alias using [`InstallerError`].
pub type Result<T> = std::result::Result<T, InstallerError>;
