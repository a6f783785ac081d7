//! kubectl installer library.
//!
//! This crate resolves the latest stable `kubectl` release, downloads the
//! linux/amd64 binary, installs it with mode 775, and verifies it by running
//! `kubectl version --client`. It is used by the `kubectl-installer` CLI
//! binary and can be driven programmatically with substitute hosts, HTTP
//! clients, and command executors.
//!
//! # Modules
//!
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Endpoints, paths, and timeouts for a run
//! - [`download`] - HTTP access, version resolution, and binary download
//! - [`error`] - Per-step error types
//! - [`host`] - OS family and effective user checks
//! - [`installer`] - The installation pipeline
//! - [`interrupt`] - Signal-driven cancellation flag
//! - [`output`] - Progress and summary formatting
//! - [`plan`] - Download URL derivation from a resolved version
//! - [`report`] - Summary of a completed install
//! - [`stager`] - Permission change and relocation
//! - [`verify`] - Post-install version check
//! - [`version`] - Validated release identifier

pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod host;
pub mod installer;
pub mod interrupt;
pub mod output;
pub mod plan;
pub mod report;
pub mod stager;
pub mod verify;
pub mod version;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
