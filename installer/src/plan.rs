//! Install plan derived from a resolved version.

use crate::config::InstallConfig;
use crate::version::StableVersion;
use camino::Utf8PathBuf;

/// Path template appended to `<release-base>/<version>` for linux/amd64.
pub const LINUX_AMD64_BINARY_PATH: &str = "bin/linux/amd64/kubectl";

/// Everything needed to download and install one kubectl release.
///
/// A plan can only be built from a [`StableVersion`], so no download URL
/// exists until the version endpoint has answered successfully.
///
/// # Examples
///
/// ```
/// use kubectl_installer::config::InstallConfig;
/// use kubectl_installer::plan::InstallPlan;
/// use kubectl_installer::version::StableVersion;
///
/// let config = InstallConfig {
///     release_base: "https://dl.example.test/release".to_owned(),
///     ..InstallConfig::default()
/// };
/// let version = StableVersion::parse("v1.29.0").expect("valid version");
/// let plan = InstallPlan::new(&config, version);
/// assert_eq!(
///     plan.download_url(),
///     "https://dl.example.test/release/v1.29.0/bin/linux/amd64/kubectl"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    version_endpoint: String,
    resolved_version: StableVersion,
    download_url: String,
    temp_path: Utf8PathBuf,
    final_path: Utf8PathBuf,
}

impl InstallPlan {
    /// Build the plan for `version` using the endpoints and paths in `config`.
    #[must_use]
    pub fn new(config: &InstallConfig, version: StableVersion) -> Self {
        let download_url = download_url(&config.release_base, &version);
        Self {
            version_endpoint: config.version_url.clone(),
            resolved_version: version,
            download_url,
            temp_path: config.temp_path.clone(),
            final_path: config.final_path.clone(),
        }
    }

    /// The endpoint the version was read from.
    #[must_use]
    pub fn version_endpoint(&self) -> &str {
        &self.version_endpoint
    }

    /// The resolved release identifier.
    #[must_use]
    pub fn resolved_version(&self) -> &StableVersion {
        &self.resolved_version
    }

    /// URL of the linux/amd64 binary for the resolved version.
    #[must_use]
    pub fn download_url(&self) -> &str {
        &self.download_url
    }

    /// Staging path for the download.
    #[must_use]
    pub fn temp_path(&self) -> &Utf8PathBuf {
        &self.temp_path
    }

    /// Final install path.
    #[must_use]
    pub fn final_path(&self) -> &Utf8PathBuf {
        &self.final_path
    }
}

fn download_url(release_base: &str, version: &StableVersion) -> String {
    let base = release_base.trim_end_matches('/');
    format!("{base}/{version}/{LINUX_AMD64_BINARY_PATH}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn version(value: &str) -> StableVersion {
        StableVersion::parse(value).expect("valid version")
    }

    #[rstest]
    #[case::plain("https://storage.googleapis.com/kubernetes-release/release")]
    #[case::trailing_slash("https://storage.googleapis.com/kubernetes-release/release/")]
    fn download_url_appends_linux_amd64_template(#[case] base: &str) {
        assert_eq!(
            download_url(base, &version("v1.29.0")),
            "https://storage.googleapis.com/kubernetes-release/release/v1.29.0/bin/linux/amd64/kubectl"
        );
    }

    #[test]
    fn plan_carries_config_paths() {
        let config = InstallConfig {
            temp_path: Utf8PathBuf::from("/scratch/kubectl"),
            final_path: Utf8PathBuf::from("/opt/bin/kubectl"),
            ..InstallConfig::default()
        };
        let plan = InstallPlan::new(&config, version("v1.30.1"));

        assert_eq!(plan.resolved_version().as_str(), "v1.30.1");
        assert_eq!(plan.version_endpoint(), config.version_url);
        assert_eq!(plan.temp_path(), "/scratch/kubectl");
        assert_eq!(plan.final_path(), "/opt/bin/kubectl");
    }
}
