//! Output formatting for the installer CLI.
//!
//! User-facing progress and summary lines go to stderr; stdout is reserved
//! for the JSON report.

use crate::host::HostIdentity;
use crate::plan::InstallPlan;
use crate::report::InstallReport;
use crate::verify::VerificationStatus;
use std::io::Write;

/// Write one line to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Format the plan shown by `--dry-run`.
///
/// # Example
///
/// ```
/// use kubectl_installer::config::InstallConfig;
/// use kubectl_installer::output::dry_run_text;
/// use kubectl_installer::plan::InstallPlan;
/// use kubectl_installer::version::StableVersion;
///
/// let version = StableVersion::parse("v1.30.1").expect("valid version");
/// let plan = InstallPlan::new(&InstallConfig::default(), version);
/// let text = dry_run_text(&plan);
/// assert!(text.contains("Dry run"));
/// assert!(text.contains("v1.30.1/bin/linux/amd64/kubectl"));
/// ```
#[must_use]
pub fn dry_run_text(plan: &InstallPlan) -> String {
    [
        "Dry run - no files will be modified".to_owned(),
        String::new(),
        format!("Version endpoint: {}", plan.version_endpoint()),
        format!("Resolved version: {}", plan.resolved_version()),
        format!("Download URL: {}", plan.download_url()),
        format!("Temporary path: {}", plan.temp_path()),
        format!("Install path: {}", plan.final_path()),
    ]
    .join("\n")
}

/// Describe the verification outcome in one line.
#[must_use]
pub fn verification_message(status: &VerificationStatus) -> String {
    match status {
        VerificationStatus::Exited { code: 0 } => {
            "kubectl version --client exited successfully".to_owned()
        }
        VerificationStatus::Exited { code } => {
            format!("warning: kubectl version --client exited with status {code}")
        }
        VerificationStatus::Terminated => {
            "warning: kubectl version --client was terminated by a signal".to_owned()
        }
        VerificationStatus::TimedOut { after_secs } => {
            format!("warning: kubectl version --client did not finish within {after_secs}s")
        }
        VerificationStatus::Unavailable { reason } => {
            format!("warning: could not run kubectl version --client: {reason}")
        }
    }
}

/// Describe the host that passed the precondition check.
#[must_use]
pub fn host_message(identity: &HostIdentity) -> String {
    format!(
        "Operating system is {}, user id is {}",
        identity.os, identity.uid
    )
}

/// Format the closing message after installation.
#[must_use]
pub fn success_message(report: &InstallReport) -> String {
    format!(
        "Installed kubectl {} to {} (os {}, uid {})",
        report.resolved_version, report.final_path, report.os, report.uid
    )
}
