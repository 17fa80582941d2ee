//! Packaged-app channel (Microsoft Store)
//!
//! The Store's package repository lives under the current user's registry hive,
//! one subkey per installed package, keyed by the full package identity:
//!
//! `Microsoft.MicrosoftPowerBIDesktop_2.91.884.0_x64__8wekyb3d8bbwe`
//!
//! The identity string itself carries the version and the architecture marker,
//! so neither is read from the binary here. Binaries in these installs are not
//! executable by standard users; records from this channel are the ones that
//! later go through shadow copy.

use std::path::PathBuf;

use tracing::{debug, warn};

use super::catalog::SystemCatalog;
use super::{BIN_DIR, Channel, InstallationRecord, MAIN_EXECUTABLE, STORE_PACKAGE_PREFIX};
use crate::version::parse_lenient;

const PACKAGES_KEY: &str = "HKCU\\Software\\Classes\\Local Settings\\Software\\Microsoft\\Windows\\CurrentVersion\\AppModel\\Repository\\Packages";
const PACKAGE_ROOT_VALUE: &str = "PackageRootFolder";

pub(super) fn candidates(catalog: &dyn SystemCatalog) -> Vec<InstallationRecord> {
    catalog
        .subkeys(PACKAGES_KEY)
        .into_iter()
        .filter(|identity| identity.starts_with(STORE_PACKAGE_PREFIX))
        .filter_map(|identity| candidate_from_entry(catalog, &identity))
        .collect()
}

/// Build a record from one repository entry, skipping it on any defect.
fn candidate_from_entry(
    catalog: &dyn SystemCatalog,
    identity: &str,
) -> Option<InstallationRecord> {
    let entry_key = format!("{PACKAGES_KEY}\\{identity}");
    let Some(root) = catalog.string_value(&entry_key, PACKAGE_ROOT_VALUE) else {
        warn!(identity, "package entry has no {PACKAGE_ROOT_VALUE} value, skipping");
        return None;
    };

    let install_dir = PathBuf::from(root);
    let main_exe = install_dir.join(BIN_DIR).join(MAIN_EXECUTABLE);
    if !main_exe.is_file() {
        warn!(
            identity,
            exe = %main_exe.display(),
            "package entry points at a tree without the main executable, skipping"
        );
        return None;
    }

    // Identity layout: <name>_<version>_<arch>__<publisher>
    let mut segments = identity.split('_').filter(|s| !s.is_empty());
    let _name = segments.next();
    let product_version = segments.next().unwrap_or_default().to_string();
    let arch = segments.next().unwrap_or_default();

    debug!(identity, version = %product_version, arch, "found Store install");

    Some(InstallationRecord {
        version: parse_lenient(&product_version),
        product_version,
        is_64bit: arch.eq_ignore_ascii_case("x64"),
        install_dir,
        channel: Channel::PackagedApp,
    })
}
