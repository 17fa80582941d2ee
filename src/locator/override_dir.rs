//! Operator-override channel
//!
//! `PBILOCATE_INSTALL_DIR` names a directory the operator wants used instead of
//! anything the catalogs know about. The directory is only trusted as far as it
//! can be verified: the main executable must exist somewhere under it, and
//! bitness plus version are read from that binary rather than taken on faith.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::{Channel, INSTALL_DIR_ENV, InstallationRecord, MAIN_EXECUTABLE, pe};

/// The override directory named by the environment, if any.
pub(super) fn from_env() -> Option<PathBuf> {
    let dir = std::env::var(INSTALL_DIR_ENV).ok()?;
    if dir.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(dir))
}

pub(super) fn candidates(dir: Option<&Path>) -> Vec<InstallationRecord> {
    let Some(dir) = dir else {
        return Vec::new();
    };

    debug!(dir = %dir.display(), "checking operator-override install dir");
    candidate_from_dir(dir).into_iter().collect()
}

/// Validate an override directory and build its record.
///
/// Any failure logs and yields nothing; the override never aborts discovery.
fn candidate_from_dir(dir: &Path) -> Option<InstallationRecord> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "override install dir does not exist, ignoring");
        return None;
    }

    let Some(main_exe) = find_main_executable(dir) else {
        warn!(
            dir = %dir.display(),
            "override install dir does not contain {MAIN_EXECUTABLE}, ignoring"
        );
        return None;
    };

    let Some(info) = pe::inspect(&main_exe) else {
        warn!(
            exe = %main_exe.display(),
            "could not read executable metadata from override install, ignoring"
        );
        return None;
    };

    Some(InstallationRecord {
        product_version: info.version.to_string(),
        version: info.version,
        is_64bit: info.is_64bit,
        install_dir: dir.to_path_buf(),
        channel: Channel::OperatorOverride,
    })
}

/// Recursive search for the main executable. Case-insensitive on the file name
/// since the installation tree comes from a case-insensitive filesystem.
fn find_main_executable(dir: &Path) -> Option<PathBuf> {
    WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .find(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|n| n.eq_ignore_ascii_case(MAIN_EXECUTABLE))
        })
        .map(|e| e.path().to_path_buf())
}
