//! Stable version newtype for the resolved kubectl release.
//!
//! The version endpoint returns a plain-text body such as `v1.30.1\n`. The
//! trimmed body becomes a path segment of the download URL, so it must be
//! non-empty and free of whitespace and control characters.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors raised while validating a version string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    /// The endpoint body was empty after trimming.
    #[error("version endpoint returned an empty body")]
    Empty,

    /// The trimmed body contained a character unusable in a URL path segment.
    #[error("invalid character {found:?} in version \"{value}\"")]
    InvalidCharacter {
        /// The offending character.
        found: char,
        /// The trimmed value that was rejected.
        value: String,
    },
}

/// A validated kubectl release identifier (e.g. `v1.30.1`).
///
/// # Examples
///
/// ```
/// use kubectl_installer::version::StableVersion;
///
/// let version = StableVersion::parse("v1.30.1\n").expect("valid version");
/// assert_eq!(version.as_str(), "v1.30.1");
/// assert!(StableVersion::parse("  \n").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StableVersion(String);

fn is_valid_version_char(c: char) -> bool {
    !c.is_whitespace() && !c.is_control() && c != '/'
}

impl StableVersion {
    /// Validate a raw endpoint body, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::Empty`] for a blank body and
    /// [`VersionError::InvalidCharacter`] when the trimmed value contains
    /// whitespace, a control character, or a path separator.
    pub fn parse(body: &str) -> Result<Self, VersionError> {
        let value = body.trim();
        if value.is_empty() {
            return Err(VersionError::Empty);
        }
        if let Some(found) = value.chars().find(|c| !is_valid_version_char(*c)) {
            return Err(VersionError::InvalidCharacter {
                found,
                value: value.to_owned(),
            });
        }
        Ok(Self(value.to_owned()))
    }

    /// Return the version as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for StableVersion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StableVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
