//! Permission and relocation of the downloaded binary.
//!
//! The binary is marked executable in its staging location and then moved
//! over the final path. A plain `rename` is attempted first; when staging and
//! final paths live on different filesystems the file is copied into a
//! temporary sibling of the final path and persisted over it, so the final
//! path only ever holds a complete binary.

use crate::error::{InstallerError, Result};
use camino::Utf8Path;
use log::{debug, warn};
use std::fs;
use std::io;

/// Mode applied to the installed binary: rwx for owner and group, r-x for others.
pub const KUBECTL_MODE: u32 = 0o775;

/// Set [`KUBECTL_MODE`] on `path`.
///
/// # Errors
///
/// Returns [`InstallerError::Permission`] when the mode cannot be changed.
pub fn make_executable(path: &Utf8Path) -> Result<()> {
    set_mode(path, KUBECTL_MODE).map_err(|source| InstallerError::Permission {
        path: path.to_owned(),
        source,
    })
}

#[cfg(unix)]
fn set_mode(path: &Utf8Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Utf8Path, _mode: u32) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "unix permission bits are not supported on this platform",
    ))
}

/// Move `from` over `to`, replacing any existing file.
///
/// # Errors
///
/// Returns [`InstallerError::Relocation`] when the target directory is
/// missing, not writable, or the cross-device copy fails.
pub fn relocate(from: &Utf8Path, to: &Utf8Path) -> Result<()> {
    move_file(from, to).map_err(|source| InstallerError::Relocation {
        from: from.to_owned(),
        to: to.to_owned(),
        source,
    })
}

fn move_file(from: &Utf8Path, to: &Utf8Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!("{from} and {to} are on different filesystems, copying");
            copy_across_devices(from, to)
        }
        Err(e) => Err(e),
    }
}

fn copy_across_devices(from: &Utf8Path, to: &Utf8Path) -> io::Result<()> {
    let parent = to
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));

    let mut staged = tempfile::NamedTempFile::new_in(parent)?;
    let mut source = fs::File::open(from)?;
    io::copy(&mut source, staged.as_file_mut())?;
    staged.as_file().sync_all()?;
    fs::set_permissions(staged.path(), fs::metadata(from)?.permissions())?;
    staged.persist(to).map_err(|e| e.error)?;

    // `to` already holds the complete binary here.
    if let Err(e) = fs::remove_file(from) {
        warn!("installed {to} but could not remove {from}: {e}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{temp_dir, write_file};

    #[cfg(unix)]
    #[test]
    fn make_executable_sets_mode_775() {
        use std::os::unix::fs::PermissionsExt;

        let (_temp, dir) = temp_dir();
        let path = write_file(&dir, "kubectl", b"binary");

        make_executable(&path).expect("chmod succeeds");

        let mode = fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o775);
    }

    #[test]
    fn make_executable_missing_file_is_permission_error() {
        let (_temp, dir) = temp_dir();
        let err = make_executable(&dir.join("absent")).expect_err("expected failure");
        assert!(matches!(err, InstallerError::Permission { .. }));
    }

    #[test]
    fn relocate_replaces_existing_target() {
        let (_temp, dir) = temp_dir();
        let from = write_file(&dir, "kubectl.download", b"new");
        let to = write_file(&dir, "kubectl", b"old");

        relocate(&from, &to).expect("relocation succeeds");

        assert!(!from.exists());
        assert_eq!(fs::read(&to).expect("read target"), b"new");
    }

    #[test]
    fn relocate_into_missing_directory_is_relocation_error() {
        let (_temp, dir) = temp_dir();
        let from = write_file(&dir, "kubectl.download", b"new");
        let to = dir.join("missing").join("kubectl");

        let err = relocate(&from, &to).expect_err("expected failure");
        assert!(matches!(err, InstallerError::Relocation { .. }));
        assert!(from.exists());
    }

    #[cfg(unix)]
    #[test]
    fn copy_across_devices_preserves_mode_and_content() {
        use std::os::unix::fs::PermissionsExt;

        let (_temp, dir) = temp_dir();
        let from = write_file(&dir, "kubectl.download", b"payload");
        make_executable(&from).expect("chmod succeeds");
        fs::create_dir(dir.join("bin")).expect("create bin dir");
        let to = dir.join("bin").join("kubectl");

        copy_across_devices(&from, &to).expect("copy succeeds");

        assert!(!from.exists());
        assert_eq!(fs::read(&to).expect("read target"), b"payload");
        let mode = fs::metadata(&to).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o775);
    }

    #[cfg(unix)]
    #[test]
    fn copy_across_devices_succeeds_when_source_cannot_be_removed() {
        use std::os::unix::fs::PermissionsExt;

        let (_temp, dir) = temp_dir();
        let staging = dir.join("staging");
        fs::create_dir(&staging).expect("create staging dir");
        let from = write_file(&staging, "kubectl", b"payload");
        let to = dir.join("kubectl");
        fs::set_permissions(&staging, fs::Permissions::from_mode(0o555))
            .expect("make staging read-only");

        let result = copy_across_devices(&from, &to);

        fs::set_permissions(&staging, fs::Permissions::from_mode(0o755))
            .expect("restore staging permissions");
        result.expect("copy succeeds even if the source stays behind");
        assert_eq!(fs::read(&to).expect("read target"), b"payload");
    }
}
