//! Unit tests for the installation pipeline.

use super::*;
use crate::download::{DownloadError, MockReleaseClient};
use crate::test_utils::{
    ExpectedCall, StubExecutor, StubHost, completed_with, temp_dir, write_file,
};
use crate::verify::VerificationStatus;
use camino::{Utf8Path, Utf8PathBuf};
use rstest::rstest;

const VERSION_URL: &str = "https://dl.example.test/release/stable.txt";
const RELEASE_BASE: &str = "https://dl.example.test/release";
const BINARY: &[u8] = b"\x7fELF fake kubectl";

fn config_in(dir: &Utf8Path) -> InstallConfig {
    InstallConfig {
        version_url: VERSION_URL.to_owned(),
        release_base: RELEASE_BASE.to_owned(),
        temp_path: dir.join("kubectl.download"),
        final_path: dir.join("bin").join("kubectl"),
        quiet: true,
        ..InstallConfig::default()
    }
}

fn prepare_bin_dir(dir: &Utf8Path) -> Utf8PathBuf {
    let bin = dir.join("bin");
    std::fs::create_dir_all(&bin).expect("create bin dir");
    bin
}

fn serving_client(version: &'static str, binary: &'static [u8]) -> MockReleaseClient {
    let mut client = MockReleaseClient::new();
    client
        .expect_fetch_text()
        .withf(|url| url == VERSION_URL)
        .times(1)
        .returning(move |_| Ok(format!("{version}\n")));
    client
        .expect_download_to_file()
        .times(1)
        .returning(move |_, dest| {
            std::fs::write(dest, binary).map_err(DownloadError::Io)?;
            Ok(binary.len() as u64)
        });
    client
}

fn verifying(final_path: &Utf8Path, code: i32) -> StubExecutor {
    StubExecutor::new(vec![ExpectedCall {
        program: final_path.to_owned(),
        args: vec!["version", "--client"],
        result: completed_with(code),
    }])
}

fn installer(
    config: InstallConfig,
    host: StubHost,
    client: MockReleaseClient,
    executor: StubExecutor,
) -> Installer {
    Installer::with_parts(
        config,
        Box::new(host),
        Box::new(client),
        Box::new(executor),
        InterruptFlag::new(),
    )
}

#[test]
fn install_places_downloaded_bytes_at_final_path() {
    let (_temp, dir) = temp_dir();
    prepare_bin_dir(&dir);
    let config = config_in(&dir);
    let final_path = config.final_path.clone();
    let executor = verifying(&final_path, 0);

    let installer = installer(
        config,
        StubHost::linux_root(),
        serving_client("v1.30.1", BINARY),
        executor,
    );
    let report = installer.install(&mut Vec::new()).expect("install succeeds");

    assert_eq!(report.resolved_version.as_str(), "v1.30.1");
    assert_eq!(report.os, "linux");
    assert_eq!(report.uid, 0);
    assert_eq!(report.final_path, final_path);
    assert_eq!(report.verification, VerificationStatus::Exited { code: 0 });
    assert_eq!(std::fs::read(&final_path).expect("read final"), BINARY);
    assert!(!installer.config().temp_path.exists());
}

#[cfg(unix)]
#[test]
fn installed_binary_has_mode_775() {
    use std::os::unix::fs::PermissionsExt;

    let (_temp, dir) = temp_dir();
    prepare_bin_dir(&dir);
    let config = config_in(&dir);
    let final_path = config.final_path.clone();
    let executor = verifying(&final_path, 0);

    installer(
        config,
        StubHost::linux_root(),
        serving_client("v1.30.1", BINARY),
        executor,
    )
    .install(&mut Vec::new())
    .expect("install succeeds");

    let mode = std::fs::metadata(&final_path)
        .expect("metadata")
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o775);
}

#[test]
fn install_requests_templated_download_url() {
    let (_temp, dir) = temp_dir();
    prepare_bin_dir(&dir);
    let config = config_in(&dir);
    let executor = verifying(&config.final_path, 0);

    let mut client = MockReleaseClient::new();
    client
        .expect_fetch_text()
        .returning(|_| Ok("v1.29.0".to_owned()));
    client
        .expect_download_to_file()
        .withf(|url, _| url == "https://dl.example.test/release/v1.29.0/bin/linux/amd64/kubectl")
        .times(1)
        .returning(|_, dest| {
            std::fs::write(dest, BINARY).map_err(DownloadError::Io)?;
            Ok(BINARY.len() as u64)
        });

    installer(config, StubHost::linux_root(), client, executor)
        .install(&mut Vec::new())
        .expect("install succeeds");
}

#[rstest]
#[case::not_root("linux", Some(1000))]
#[case::not_linux("macos", Some(0))]
#[case::no_uid("windows", None)]
fn precondition_failure_makes_no_calls(#[case] os: &str, #[case] uid: Option<u32>) {
    let (_temp, dir) = temp_dir();
    let config = config_in(&dir);
    let temp_path = config.temp_path.clone();
    let final_path = config.final_path.clone();

    // Mocks without expectations panic if called.
    let installer = installer(
        config,
        StubHost::new(os, uid),
        MockReleaseClient::new(),
        StubExecutor::unused(),
    );
    let err = installer.install(&mut Vec::new()).expect_err("expected failure");

    assert!(matches!(err, InstallerError::Precondition { .. }));
    assert!(!temp_path.exists());
    assert!(!final_path.exists());
}

#[rstest]
#[case::empty_body(Ok("  \n".to_owned()))]
#[case::not_found(Err(DownloadError::HttpStatus { url: VERSION_URL.to_owned(), status: 404 }))]
#[case::unreachable(Err(DownloadError::Transport {
    url: VERSION_URL.to_owned(),
    reason: "connection refused".to_owned(),
}))]
fn version_failure_skips_download(
    #[case] response: std::result::Result<String, DownloadError>,
) {
    let (_temp, dir) = temp_dir();
    let config = config_in(&dir);

    let mut client = MockReleaseClient::new();
    client.expect_fetch_text().return_once(move |_| response);
    client.expect_download_to_file().never();

    let err = installer(config, StubHost::linux_root(), client, StubExecutor::unused())
        .install(&mut Vec::new())
        .expect_err("expected failure");
    assert!(matches!(err, InstallerError::VersionResolution { .. }));
}

#[test]
fn download_failure_leaves_final_path_untouched() {
    let (_temp, dir) = temp_dir();
    let bin = prepare_bin_dir(&dir);
    let existing = write_file(&bin, "kubectl", b"previous kubectl");
    let config = config_in(&dir);

    let mut client = MockReleaseClient::new();
    client
        .expect_fetch_text()
        .returning(|_| Ok("v1.30.1".to_owned()));
    client.expect_download_to_file().returning(|url, _| {
        Err(DownloadError::HttpStatus {
            url: url.to_owned(),
            status: 500,
        })
    });

    let err = installer(config, StubHost::linux_root(), client, StubExecutor::unused())
        .install(&mut Vec::new())
        .expect_err("expected failure");

    assert!(matches!(err, InstallerError::Download { .. }));
    assert_eq!(
        std::fs::read(&existing).expect("read existing"),
        b"previous kubectl"
    );
}

#[test]
fn relocation_failure_is_reported() {
    let (_temp, dir) = temp_dir();
    // No bin directory: the move has nowhere to go.
    let config = config_in(&dir);

    let err = installer(
        config,
        StubHost::linux_root(),
        serving_client("v1.30.1", BINARY),
        StubExecutor::unused(),
    )
    .install(&mut Vec::new())
    .expect_err("expected failure");

    assert!(matches!(err, InstallerError::Relocation { .. }));
}

#[test]
fn failed_verification_still_reports_success() {
    let (_temp, dir) = temp_dir();
    prepare_bin_dir(&dir);
    let config = config_in(&dir);
    let executor = verifying(&config.final_path, 1);

    let report = installer(
        config,
        StubHost::linux_root(),
        serving_client("v1.30.1", BINARY),
        executor,
    )
    .install(&mut Vec::new())
    .expect("install succeeds despite verification failure");

    assert_eq!(report.verification, VerificationStatus::Exited { code: 1 });
}

#[test]
fn interrupt_before_download_stops_without_side_effects() {
    let (_temp, dir) = temp_dir();
    prepare_bin_dir(&dir);
    let config = config_in(&dir);
    let final_path = config.final_path.clone();

    let mut client = MockReleaseClient::new();
    client
        .expect_fetch_text()
        .returning(|_| Ok("v1.30.1".to_owned()));
    client.expect_download_to_file().never();

    let interrupt = InterruptFlag::new();
    interrupt.raise();
    let installer = Installer::with_parts(
        config,
        Box::new(StubHost::linux_root()),
        Box::new(client),
        Box::new(StubExecutor::unused()),
        interrupt,
    );

    let err = installer.install(&mut Vec::new()).expect_err("expected interrupt");
    assert!(matches!(
        err,
        InstallerError::Interrupted {
            step: InstallStep::Download
        }
    ));
    assert!(!final_path.exists());
}

#[test]
fn interrupt_after_download_discards_staged_binary() {
    let (_temp, dir) = temp_dir();
    let bin = prepare_bin_dir(&dir);
    let existing = write_file(&bin, "kubectl", b"previous kubectl");
    let config = config_in(&dir);
    let temp_path = config.temp_path.clone();

    let interrupt = InterruptFlag::new();
    let signal = interrupt.clone();
    let mut client = MockReleaseClient::new();
    client
        .expect_fetch_text()
        .returning(|_| Ok("v1.30.1".to_owned()));
    client
        .expect_download_to_file()
        .times(1)
        .returning(move |_, dest| {
            std::fs::write(dest, BINARY).map_err(DownloadError::Io)?;
            signal.raise();
            Ok(BINARY.len() as u64)
        });

    let installer = Installer::with_parts(
        config,
        Box::new(StubHost::linux_root()),
        Box::new(client),
        Box::new(StubExecutor::unused()),
        interrupt,
    );

    let err = installer.install(&mut Vec::new()).expect_err("expected interrupt");
    assert!(matches!(
        err,
        InstallerError::Interrupted {
            step: InstallStep::MakeExecutable
        }
    ));
    assert!(!temp_path.exists());
    assert_eq!(
        std::fs::read(&existing).expect("read existing"),
        b"previous kubectl"
    );
}

#[test]
fn plan_resolves_without_downloading() {
    let (_temp, dir) = temp_dir();
    let config = config_in(&dir);

    let mut client = MockReleaseClient::new();
    client
        .expect_fetch_text()
        .returning(|_| Ok("v1.29.0\n".to_owned()));
    client.expect_download_to_file().never();

    let plan = installer(config, StubHost::linux_root(), client, StubExecutor::unused())
        .plan(&mut Vec::new())
        .expect("plan resolves");

    assert_eq!(
        plan.download_url(),
        "https://dl.example.test/release/v1.29.0/bin/linux/amd64/kubectl"
    );
    assert!(!plan.temp_path().exists());
}

#[test]
fn progress_lines_are_numbered_unless_quiet() {
    let (_temp, dir) = temp_dir();
    prepare_bin_dir(&dir);
    let config = InstallConfig {
        quiet: false,
        ..config_in(&dir)
    };
    let executor = verifying(&config.final_path, 0);

    let mut stderr = Vec::new();
    installer(
        config,
        StubHost::linux_root(),
        serving_client("v1.30.1", BINARY),
        executor,
    )
    .install(&mut stderr)
    .expect("install succeeds");

    let text = String::from_utf8(stderr).expect("stderr was not UTF-8");
    for step in 1..=5 {
        assert!(text.contains(&format!("[STEP {step}/5]")), "missing step {step}: {text}");
    }
    assert!(text.contains("exited successfully"));
    assert!(text.contains("Operating system is linux, user id is 0"));
}

#[test]
fn step_names_are_human_readable() {
    assert_eq!(InstallStep::MakeExecutable.to_string(), "permission change");
    assert_eq!(InstallStep::ResolveVersion.to_string(), "version resolution");
}
