//! Installation discovery for Power BI Desktop
//!
//! Three independent channels produce candidates:
//! - an operator-supplied directory (`PBILOCATE_INSTALL_DIR`),
//! - the Microsoft Store package repository (sandboxed installs),
//! - the classic installer registry keys.
//!
//! Enumeration is best-effort throughout. A broken catalog entry, a missing
//! directory, or an unreadable binary drops that one candidate with a log line;
//! it never aborts the pass. `enumerate` always returns, possibly empty.

pub mod catalog;
mod msi;
mod override_dir;
pub mod pe;
mod packaged;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::version::ProductVersion;
use catalog::SystemCatalog;

/// File that proves a directory really is a Power BI Desktop installation.
pub const MAIN_EXECUTABLE: &str = "PBIDesktop.exe";

/// The bundled Analysis Services engine.
pub const SERVER_EXECUTABLE: &str = "msmdsrv.exe";

/// Subdirectory of the install dir holding both executables.
pub const BIN_DIR: &str = "bin";

/// Environment variable for the operator-override channel.
pub const INSTALL_DIR_ENV: &str = "PBILOCATE_INSTALL_DIR";

/// Identity prefix of Power BI Desktop packages in the Store repository.
pub const STORE_PACKAGE_PREFIX: &str = "Microsoft.MicrosoftPowerBIDesktop";

/// Where an installation record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Channel {
    PackagedApp,
    TraditionalInstaller,
    OperatorOverride,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::PackagedApp => write!(f, "packaged-app"),
            Channel::TraditionalInstaller => write!(f, "traditional-installer"),
            Channel::OperatorOverride => write!(f, "operator-override"),
        }
    }
}

/// One discovered installation. Immutable once constructed; the install dir
/// contained [`MAIN_EXECUTABLE`] at discovery time and is not re-checked later.
#[derive(Debug, Clone, Serialize)]
pub struct InstallationRecord {
    /// Version as the channel reported it, before parsing.
    pub product_version: String,
    pub version: ProductVersion,
    pub is_64bit: bool,
    pub install_dir: PathBuf,
    pub channel: Channel,
}

impl InstallationRecord {
    /// Expected location of the engine inside this installation.
    pub fn server_executable_path(&self) -> PathBuf {
        self.install_dir.join(server_relative_path())
    }
}

/// Engine path relative to an install (or shadow-copy) root.
pub fn server_relative_path() -> PathBuf {
    Path::new(BIN_DIR).join(SERVER_EXECUTABLE)
}

/// Enumerates installation candidates across all channels.
pub struct Locator {
    catalog: Box<dyn SystemCatalog>,
    override_dir: Option<PathBuf>,
}

impl Locator {
    /// Locator over the running system's catalogs and environment.
    pub fn from_system() -> Self {
        let mut locator = Self::with_catalog(catalog::system_catalog());
        locator.override_dir = override_dir::from_env();
        locator
    }

    /// Locator over an explicit catalog, with no environment override.
    pub fn with_catalog(catalog: Box<dyn SystemCatalog>) -> Self {
        Self {
            catalog,
            override_dir: None,
        }
    }

    /// Add an operator-override directory, as `PBILOCATE_INSTALL_DIR` would.
    pub fn with_override_dir(mut self, dir: PathBuf) -> Self {
        self.override_dir = Some(dir);
        self
    }

    /// Collect candidates from every channel, in a fixed channel order:
    /// operator-override, then packaged-app, then traditional-installer.
    /// Within a channel, order follows catalog iteration; selection's tie-break
    /// depends only on this sequence being stable for a given input.
    pub fn enumerate(&self) -> Vec<InstallationRecord> {
        let mut records = Vec::new();
        records.extend(override_dir::candidates(self.override_dir.as_deref()));
        records.extend(packaged::candidates(self.catalog.as_ref()));
        records.extend(msi::candidates(self.catalog.as_ref()));

        debug!(count = records.len(), "installation discovery complete");
        records
    }
}
