//! Traditional-installer channel
//!
//! The classic installer writes its location to one of two fixed registry keys:
//! the plain machine hive, and the WOW6432Node redirection path a 32-bit
//! installer lands under on a 64-bit OS. Each key yields at most one candidate.
//! Bitness is an explicit `Win64` value holding `Yes` or `No`; the entry does
//! not record a version, so that comes from the main executable's version
//! resource, with the zero version as the fallback.

use std::path::PathBuf;

use tracing::{debug, warn};

use super::catalog::SystemCatalog;
use super::{BIN_DIR, Channel, InstallationRecord, MAIN_EXECUTABLE, pe};
use crate::version::ProductVersion;

const INSTALLER_KEYS: [&str; 2] = [
    "HKLM\\SOFTWARE\\Microsoft\\Microsoft Power BI Desktop\\Installer",
    "HKLM\\SOFTWARE\\WOW6432Node\\Microsoft\\Microsoft Power BI Desktop\\Installer",
];
const INSTALL_PATH_VALUE: &str = "InstallPath";
const WIN64_VALUE: &str = "Win64";
const WIN64_AFFIRMATIVE: &str = "yes";

pub(super) fn candidates(catalog: &dyn SystemCatalog) -> Vec<InstallationRecord> {
    INSTALLER_KEYS
        .iter()
        .filter_map(|key| candidate_from_key(catalog, key))
        .collect()
}

fn candidate_from_key(catalog: &dyn SystemCatalog, key: &str) -> Option<InstallationRecord> {
    let install_dir = PathBuf::from(catalog.string_value(key, INSTALL_PATH_VALUE)?);

    let main_exe = install_dir.join(BIN_DIR).join(MAIN_EXECUTABLE);
    if !main_exe.is_file() {
        warn!(
            key,
            exe = %main_exe.display(),
            "installer entry points at a tree without the main executable, skipping"
        );
        return None;
    }

    let is_64bit = catalog
        .string_value(key, WIN64_VALUE)
        .is_some_and(|v| v.trim().eq_ignore_ascii_case(WIN64_AFFIRMATIVE));

    let version = match pe::inspect(&main_exe) {
        Some(info) => info.version,
        None => {
            debug!(exe = %main_exe.display(), "no readable version resource, using zero version");
            ProductVersion::ZERO
        }
    };

    debug!(key, dir = %install_dir.display(), %version, is_64bit, "found installer-channel install");

    Some(InstallationRecord {
        product_version: version.to_string(),
        version,
        is_64bit,
        install_dir,
        channel: Channel::TraditionalInstaller,
    })
}
