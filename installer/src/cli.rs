//! CLI argument definitions for the kubectl installer.
//!
//! Every flag has a default, so running the binary with no arguments installs
//! the latest stable kubectl to `/usr/local/bin/kubectl`.

use crate::config::{
    DEFAULT_FINAL_PATH, DEFAULT_HTTP_TIMEOUT, DEFAULT_RELEASE_BASE, DEFAULT_TEMP_PATH,
    DEFAULT_VERIFY_TIMEOUT, DEFAULT_VERSION_URL,
};
use camino::Utf8PathBuf;
use clap::Parser;

/// Install the latest stable kubectl release for linux/amd64.
#[derive(Parser, Debug)]
#[command(name = "kubectl-installer")]
#[command(version, about)]
#[command(long_about = concat!(
    "Install the latest stable kubectl release for linux/amd64.\n\n",
    "The installer must run as root on Linux. It resolves the latest stable ",
    "version, downloads the binary to a temporary path, marks it executable ",
    "(mode 775), moves it into place, and runs `kubectl version --client` to ",
    "verify the result.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Install to /usr/local/bin/kubectl:\n",
    "    $ sudo kubectl-installer\n\n",
    "  Show the resolved version and URLs without downloading:\n",
    "    $ sudo kubectl-installer --dry-run\n\n",
    "  Emit the install report as JSON on stdout:\n",
    "    $ sudo kubectl-installer --json --quiet\n",
))]
pub struct Cli {
    /// Installation settings.
    #[command(flatten)]
    pub install: InstallArgs,

    /// Resolve the version and print the plan without downloading anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the install report as JSON on stdout.
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(short, long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

/// Endpoint, path, and timeout settings for an install.
#[derive(Parser, Debug, Clone)]
pub struct InstallArgs {
    /// URL returning the latest stable version string.
    #[arg(long, value_name = "URL", default_value = DEFAULT_VERSION_URL)]
    pub version_url: String,

    /// Release base URL; the binary is fetched from BASE/VERSION/bin/linux/amd64/kubectl.
    #[arg(long, value_name = "BASE", default_value = DEFAULT_RELEASE_BASE)]
    pub release_base: String,

    /// Temporary download location.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_TEMP_PATH)]
    pub temp_path: Utf8PathBuf,

    /// Final install location (should already be on PATH).
    #[arg(long, value_name = "PATH", default_value = DEFAULT_FINAL_PATH)]
    pub install_path: Utf8PathBuf,

    /// Network timeout in seconds for the version fetch and for connecting to
    /// the download (the binary body streams without a time limit).
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_HTTP_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// Timeout in seconds for the `kubectl version --client` check.
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_VERIFY_TIMEOUT.as_secs())]
    pub verify_timeout: u64,

    /// Suppress progress output (errors still shown).
    #[arg(short, long)]
    pub quiet: bool,
}
