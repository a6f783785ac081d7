//! Installation pipeline orchestration.
//!
//! [`Installer::install`] runs the five steps in order: precondition check,
//! version resolution, download, permission change plus relocation, and
//! verification. Each of the first four steps aborts the run on failure;
//! verification only reports.
//!
//! Constructing an [`Installer`] performs no I/O. All network and filesystem
//! effects happen inside [`Installer::install`] or [`Installer::plan`].

use crate::config::InstallConfig;
use crate::download::{
    HttpReleaseClient, ReleaseClient, discard_partial, download_binary, resolve_version,
};
use crate::error::{InstallerError, Result};
use crate::host::{HostEnvironment, HostIdentity, SystemHost, check_preconditions};
use crate::interrupt::InterruptFlag;
use crate::output::{host_message, verification_message, write_stderr_line};
use crate::plan::InstallPlan;
use crate::report::InstallReport;
use crate::stager::{KUBECTL_MODE, make_executable, relocate};
use crate::verify::{CommandExecutor, SystemCommandExecutor, verify_install};
use log::{debug, info};
use std::fmt;
use std::io::Write;

/// Number of user-visible steps in a full install.
const STEP_COUNT: usize = 5;

/// The stages of an installation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStep {
    /// OS family and effective user check.
    Precondition,
    /// Stable-version lookup.
    ResolveVersion,
    /// Binary download to the temporary path.
    Download,
    /// Permission change on the downloaded binary.
    MakeExecutable,
    /// Move into the final path.
    Relocate,
    /// `kubectl version --client` check.
    Verify,
}

impl fmt::Display for InstallStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Precondition => "precondition check",
            Self::ResolveVersion => "version resolution",
            Self::Download => "download",
            Self::MakeExecutable => "permission change",
            Self::Relocate => "relocation",
            Self::Verify => "verification",
        };
        f.write_str(name)
    }
}

/// Installs kubectl according to an [`InstallConfig`].
pub struct Installer {
    config: InstallConfig,
    host: Box<dyn HostEnvironment>,
    client: Box<dyn ReleaseClient>,
    executor: Box<dyn CommandExecutor>,
    interrupt: InterruptFlag,
}

impl Installer {
    /// Create an installer backed by the real host, HTTP client, and process
    /// executor.
    #[must_use]
    pub fn new(config: InstallConfig, interrupt: InterruptFlag) -> Self {
        let client = HttpReleaseClient::new(config.http_timeout);
        Self::with_parts(
            config,
            Box::new(SystemHost),
            Box::new(client),
            Box::new(SystemCommandExecutor),
            interrupt,
        )
    }

    /// Create an installer from explicit collaborators.
    ///
    /// Tests use this to substitute hosts, HTTP clients, and executors.
    #[must_use]
    pub fn with_parts(
        config: InstallConfig,
        host: Box<dyn HostEnvironment>,
        client: Box<dyn ReleaseClient>,
        executor: Box<dyn CommandExecutor>,
        interrupt: InterruptFlag,
    ) -> Self {
        Self {
            config,
            host,
            client,
            executor,
            interrupt,
        }
    }

    /// The configuration this installer runs with.
    #[must_use]
    pub fn config(&self) -> &InstallConfig {
        &self.config
    }

    /// Run the precondition check and resolve the version, without
    /// downloading anything.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Precondition`] or
    /// [`InstallerError::VersionResolution`].
    pub fn plan(&self, stderr: &mut dyn Write) -> Result<InstallPlan> {
        let identity = self.check_host(stderr)?;
        debug!("host identity: {identity:?}");
        self.resolve_plan(stderr)
    }

    /// Install the latest stable kubectl and verify it.
    ///
    /// A non-zero or missing verification status is recorded in the report
    /// and does not make this method fail.
    ///
    /// # Errors
    ///
    /// Returns the error of the first step that fails, or
    /// [`InstallerError::Interrupted`] if a signal arrives before a step that
    /// modifies the filesystem.
    pub fn install(&self, stderr: &mut dyn Write) -> Result<InstallReport> {
        let identity = self.check_host(stderr)?;
        let plan = self.resolve_plan(stderr)?;

        self.ensure_not_interrupted(InstallStep::Download, &plan)?;
        self.progress(
            stderr,
            3,
            format!(
                "Downloading kubectl {} from {}",
                plan.resolved_version(),
                plan.download_url()
            ),
        );
        let bytes = download_binary(self.client.as_ref(), &plan)?;
        debug!("downloaded {bytes} bytes to {}", plan.temp_path());

        self.ensure_not_interrupted(InstallStep::MakeExecutable, &plan)?;
        self.progress(
            stderr,
            4,
            format!(
                "Making {} executable (mode {KUBECTL_MODE:o}) and moving it to {}",
                plan.temp_path(),
                plan.final_path()
            ),
        );
        make_executable(plan.temp_path())?;
        self.ensure_not_interrupted(InstallStep::Relocate, &plan)?;
        relocate(plan.temp_path(), plan.final_path())?;
        info!("installed {} to {}", plan.resolved_version(), plan.final_path());

        self.progress(
            stderr,
            5,
            format!("Verifying with {} version --client", plan.final_path()),
        );
        let verification = verify_install(
            self.executor.as_ref(),
            plan.final_path(),
            self.config.verify_timeout,
        );
        if !self.config.quiet {
            write_stderr_line(stderr, verification_message(&verification));
        }

        Ok(InstallReport {
            resolved_version: plan.resolved_version().clone(),
            os: identity.os,
            uid: identity.uid,
            final_path: plan.final_path().clone(),
            verification,
        })
    }

    fn check_host(&self, stderr: &mut dyn Write) -> Result<HostIdentity> {
        self.progress(stderr, 1, "Checking host operating system and user");
        let identity = check_preconditions(self.host.as_ref())?;
        if !self.config.quiet {
            write_stderr_line(stderr, host_message(&identity));
        }
        Ok(identity)
    }

    fn resolve_plan(&self, stderr: &mut dyn Write) -> Result<InstallPlan> {
        self.progress(
            stderr,
            2,
            format!("Resolving latest stable version from {}", self.config.version_url),
        );
        let version = resolve_version(self.client.as_ref(), &self.config.version_url)?;
        info!("latest stable kubectl is {version}");
        Ok(InstallPlan::new(&self.config, version))
    }

    /// Stop before `step` if an interrupt arrived, removing any staged file.
    fn ensure_not_interrupted(&self, step: InstallStep, plan: &InstallPlan) -> Result<()> {
        if !self.interrupt.is_raised() {
            return Ok(());
        }
        info!("interrupt received, stopping before {step}");
        if step != InstallStep::Download {
            discard_partial(plan.temp_path());
        }
        Err(InstallerError::Interrupted { step })
    }

    fn progress(&self, stderr: &mut dyn Write, step: usize, message: impl fmt::Display) {
        if !self.config.quiet {
            write_stderr_line(stderr, format!("[STEP {step}/{STEP_COUNT}] {message}"));
        }
    }
}

#[cfg(test)]
#[path = "installer_tests.rs"]
mod tests;
