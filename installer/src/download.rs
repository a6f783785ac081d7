//! Release download logic for the stable-version endpoint and the binary.
//!
//! Provides a trait-based abstraction over HTTP so the installer can be
//! exercised against mocks, plus the version-resolution and download steps
//! built on top of it.

use crate::error::{InstallerError, Result};
use crate::plan::InstallPlan;
use crate::version::StableVersion;
use camino::Utf8Path;
use log::{debug, warn};
use std::time::Duration;

/// Trait for fetching release resources over HTTP.
///
/// Abstractions allow tests to mock HTTP behaviour without network access.
#[cfg_attr(test, mockall::automock)]
pub trait ReleaseClient {
    /// Fetch `url` and return the body as text.
    ///
    /// # Errors
    ///
    /// Returns an error for transport failures and non-2xx statuses.
    fn fetch_text(&self, url: &str) -> std::result::Result<String, DownloadError>;

    /// Fetch `url` and stream the body into `dest`, replacing any existing
    /// file. Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error for transport failures, non-2xx statuses, or when
    /// the file cannot be written.
    fn download_to_file(
        &self,
        url: &str,
        dest: &Utf8Path,
    ) -> std::result::Result<u64, DownloadError>;
}

/// Errors arising from release download operations.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    HttpStatus {
        /// The URL that was requested.
        url: String,
        /// The status code received.
        status: u16,
    },

    /// The request failed before a status was received.
    #[error("request to {url} failed: {reason}")]
    Transport {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// I/O error writing the downloaded file.
    #[error("I/O error writing download: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP-based client built on two `ureq` agents.
///
/// The version fetch is small, so its whole call is bounded by the timeout.
/// The binary is tens of megabytes, so its timeout only bounds connecting
/// and waiting for the response head; the body streams for as long as data
/// keeps arriving.
#[derive(Clone)]
pub struct HttpReleaseClient {
    text_agent: ureq::Agent,
    download_agent: ureq::Agent,
}

impl HttpReleaseClient {
    /// Create a client using `timeout` for each request.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let text_config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        let download_config = ureq::Agent::config_builder()
            .timeout_connect(Some(timeout))
            .timeout_recv_response(Some(timeout))
            .build();
        Self {
            text_agent: ureq::Agent::new_with_config(text_config),
            download_agent: ureq::Agent::new_with_config(download_config),
        }
    }
}

fn get(
    agent: &ureq::Agent,
    url: &str,
) -> std::result::Result<ureq::http::Response<ureq::Body>, DownloadError> {
    debug!("GET {url}");
    agent.get(url).call().map_err(|e| map_ureq_error(url, &e))
}

impl ReleaseClient for HttpReleaseClient {
    fn fetch_text(&self, url: &str) -> std::result::Result<String, DownloadError> {
        get(&self.text_agent, url)?
            .into_body()
            .read_to_string()
            .map_err(|e| DownloadError::Transport {
                url: url.to_owned(),
                reason: e.to_string(),
            })
    }

    fn download_to_file(
        &self,
        url: &str,
        dest: &Utf8Path,
    ) -> std::result::Result<u64, DownloadError> {
        let response = get(&self.download_agent, url)?;
        let mut file = create_fresh(dest)?;
        let mut body = response.into_body().into_reader();
        let written = std::io::copy(&mut body, &mut file)?;
        file.sync_all()?;
        Ok(written)
    }
}

/// Unlink `path` and create it anew, so a planted symlink or foreign file at
/// a shared location such as `/tmp/kubectl` is never written through.
fn create_fresh(path: &Utf8Path) -> std::io::Result<std::fs::File> {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(status) => DownloadError::HttpStatus {
            url: url.to_owned(),
            status: *status,
        },
        other => DownloadError::Transport {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}

/// Query the stable-version endpoint and validate its body.
///
/// # Errors
///
/// Returns [`InstallerError::VersionResolution`] for network errors,
/// non-2xx statuses, and empty or malformed bodies.
pub fn resolve_version(client: &dyn ReleaseClient, url: &str) -> Result<StableVersion> {
    let body = client
        .fetch_text(url)
        .map_err(|e| InstallerError::VersionResolution {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;

    StableVersion::parse(&body).map_err(|e| InstallerError::VersionResolution {
        url: url.to_owned(),
        reason: e.to_string(),
    })
}

/// Download the planned binary to its temporary path.
///
/// A failed download leaves no file behind at the temporary path; the final
/// path is never touched by this step.
///
/// # Errors
///
/// Returns [`InstallerError::Download`] when the request or the write fails.
pub fn download_binary(client: &dyn ReleaseClient, plan: &InstallPlan) -> Result<u64> {
    let url = plan.download_url();
    let temp_path = plan.temp_path();

    client.download_to_file(url, temp_path).map_err(|e| {
        discard_partial(temp_path);
        InstallerError::Download {
            url: url.to_owned(),
            reason: e.to_string(),
        }
    })
}

/// Remove a partially written download, ignoring a file that never existed.
pub(crate) fn discard_partial(path: &Utf8Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("removed partial download at {path}"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("could not remove partial download at {path}: {e}"),
    }
}
