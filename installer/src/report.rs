//! Summary of a completed installation.

use crate::verify::VerificationStatus;
use crate::version::StableVersion;
use camino::Utf8PathBuf;
use serde::Serialize;

/// What a successful [`Installer::install`](crate::installer::Installer::install)
/// run installed and how verification went.
///
/// A failed verification still yields a report; callers decide what to do
/// with [`InstallReport::verification`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    /// The installed release.
    pub resolved_version: StableVersion,
    /// Detected operating system family.
    pub os: String,
    /// Detected effective user identifier.
    pub uid: u32,
    /// Where the binary was installed.
    pub final_path: Utf8PathBuf,
    /// Outcome of `kubectl version --client`.
    pub verification: VerificationStatus,
}

impl InstallReport {
    /// Serialise the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json` error if serialisation fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_report_flattens_version_and_tags_verification() {
        let report = InstallReport {
            resolved_version: StableVersion::parse("v1.30.1").expect("valid version"),
            os: "linux".to_owned(),
            uid: 0,
            final_path: Utf8PathBuf::from("/usr/local/bin/kubectl"),
            verification: VerificationStatus::Exited { code: 0 },
        };

        let json: serde_json::Value =
            serde_json::from_str(&report.to_json().expect("encode")).expect("decode");

        assert_eq!(json["resolved_version"], "v1.30.1");
        assert_eq!(json["final_path"], "/usr/local/bin/kubectl");
        assert_eq!(json["verification"]["outcome"], "exited");
        assert_eq!(json["verification"]["code"], 0);
    }
}
