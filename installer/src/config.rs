//! Installer configuration.
//!
//! Endpoints, paths, and timeouts are plain values supplied by the caller so
//! tests can point the installer at mock servers and temporary directories.
//! Building a configuration never touches the network or the filesystem.

use crate::cli::InstallArgs;
use camino::Utf8PathBuf;
use std::time::Duration;

/// Endpoint returning the latest stable kubectl version as plain text.
pub const DEFAULT_VERSION_URL: &str =
    "https://storage.googleapis.com/kubernetes-release/release/stable.txt";

/// Base URL under which versioned kubectl binaries are published.
pub const DEFAULT_RELEASE_BASE: &str = "https://storage.googleapis.com/kubernetes-release/release";

/// Staging location for the downloaded binary.
pub const DEFAULT_TEMP_PATH: &str = "/tmp/kubectl";

/// Final install location; must already be on `PATH`.
pub const DEFAULT_FINAL_PATH: &str = "/usr/local/bin/kubectl";

/// Network timeout: bounds the whole version fetch, and connecting plus
/// waiting for the response head of the binary download.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on the `kubectl version --client` check.
pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for a single installer run.
///
/// # Examples
///
/// ```
/// use kubectl_installer::config::InstallConfig;
///
/// let config = InstallConfig::default();
/// assert_eq!(config.final_path, "/usr/local/bin/kubectl");
/// assert!(config.version_url.ends_with("stable.txt"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallConfig {
    /// URL of the stable-version endpoint.
    pub version_url: String,
    /// Release base the download URL is derived from.
    pub release_base: String,
    /// Where the binary is written before relocation.
    pub temp_path: Utf8PathBuf,
    /// Where the binary is installed.
    pub final_path: Utf8PathBuf,
    /// Network timeout; the binary body itself is not time-limited.
    pub http_timeout: Duration,
    /// Timeout for the post-install verification command.
    pub verify_timeout: Duration,
    /// Suppress progress output.
    pub quiet: bool,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            version_url: DEFAULT_VERSION_URL.to_owned(),
            release_base: DEFAULT_RELEASE_BASE.to_owned(),
            temp_path: Utf8PathBuf::from(DEFAULT_TEMP_PATH),
            final_path: Utf8PathBuf::from(DEFAULT_FINAL_PATH),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            verify_timeout: DEFAULT_VERIFY_TIMEOUT,
            quiet: false,
        }
    }
}

impl From<&InstallArgs> for InstallConfig {
    fn from(args: &InstallArgs) -> Self {
        Self {
            version_url: args.version_url.clone(),
            release_base: args.release_base.clone(),
            temp_path: args.temp_path.clone(),
            final_path: args.install_path.clone(),
            http_timeout: Duration::from_secs(args.timeout),
            verify_timeout: Duration::from_secs(args.verify_timeout),
            quiet: args.quiet,
        }
    }
}
