//! Dependency resolution: the consumer-facing query surface
//!
//! A [`DependenciesResolver`] runs discovery and selection at most once and
//! answers every later query from the memoized result. Construct one instance
//! and thread it through; substituting a test double means constructing a
//! resolver over a different [`Locator`], not mutating shared state. First
//! access from multiple threads is safe: `OnceLock` makes the compute-once
//! explicit.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::debug;

use crate::error::{PbiLocateError, Result};
use crate::libresolve::LibraryResolver;
use crate::locator::{Channel, InstallationRecord, Locator, server_relative_path};
use crate::selector;
use crate::shadow::{self, ShadowCopyEngine};

/// Outcome of a server-executable lookup.
#[derive(Debug, Clone)]
pub struct ServerExecutable {
    /// The path to use: the relocated copy when one exists, the original
    /// in-install path otherwise.
    pub path: PathBuf,
    /// Whether `path` exists on disk right now.
    pub available: bool,
    /// Whether `path` points into the shadow-copy cache.
    pub relocated: bool,
}

pub struct DependenciesResolver {
    locator: Locator,
    selected: OnceLock<Option<InstallationRecord>>,
    /// Overrides the shadow-copy cache root; `None` means the default
    /// per-user location (still subject to `PBILOCATE_DATA_DIR`).
    shadow_root: Option<PathBuf>,
}

impl DependenciesResolver {
    pub fn new(locator: Locator) -> Self {
        Self {
            locator,
            selected: OnceLock::new(),
            shadow_root: None,
        }
    }

    /// Resolver over the running system's catalogs.
    pub fn from_system() -> Self {
        Self::new(Locator::from_system())
    }

    /// Use an explicit shadow-copy cache root instead of the per-user default.
    pub fn with_shadow_root(mut self, root: PathBuf) -> Self {
        self.shadow_root = Some(root);
        self
    }

    fn shadow_dir(&self, identity: &str) -> Result<PathBuf> {
        match &self.shadow_root {
            Some(root) => Ok(root.join(identity)),
            None => shadow::shadow_dir(identity),
        }
    }

    fn shadow_engine(&self) -> Result<ShadowCopyEngine> {
        match &self.shadow_root {
            Some(root) => Ok(ShadowCopyEngine::with_root(root.clone())),
            None => ShadowCopyEngine::new(),
        }
    }

    /// The selected installation, running discovery on first call.
    ///
    /// Fails with [`PbiLocateError::NoUsableInstallation`] when no 64-bit
    /// candidate survives selection; that result is memoized too.
    pub fn selected_installation(&self) -> Result<&InstallationRecord> {
        self.selected
            .get_or_init(|| {
                let candidates = self.locator.enumerate();
                let selected = selector::select(&candidates).cloned();
                if let Some(ref record) = selected {
                    debug!(
                        dir = %record.install_dir.display(),
                        channel = %record.channel,
                        version = %record.version,
                        "selected installation"
                    );
                }
                selected
            })
            .as_ref()
            .ok_or(PbiLocateError::NoUsableInstallation)
    }

    /// Directory of the selected installation, forcing discovery if needed.
    pub fn effective_install_dir(&self) -> Result<PathBuf> {
        Ok(self.selected_installation()?.install_dir.clone())
    }

    /// Locate the server executable.
    ///
    /// For a packaged-app install an existing relocated copy under the cache
    /// directory for that install's identity is preferred over the original,
    /// even when both are present. `available` reports whether some usable
    /// path exists on disk; staleness of the memoized install is accepted.
    pub fn try_find_server_executable(&self) -> Result<ServerExecutable> {
        let record = self.selected_installation()?;

        if record.channel == Channel::PackagedApp {
            if let Some((_, identity)) = shadow::split_packaged_source(&record.install_dir) {
                let relocated = self.shadow_dir(&identity)?.join(server_relative_path());
                if relocated.is_file() {
                    return Ok(ServerExecutable {
                        path: relocated,
                        available: true,
                        relocated: true,
                    });
                }
            }
        }

        let original = record.server_executable_path();
        Ok(ServerExecutable {
            available: original.is_file(),
            path: original,
            relocated: false,
        })
    }

    /// Relocate the server executable and its dependencies into the cache.
    ///
    /// `source` must belong to the packaged-app channel, recognized by the
    /// package-identity segment in its path; any other source fails with
    /// [`PbiLocateError::UnsupportedRelocationSource`] before touching the
    /// filesystem. Returns the relocated server executable path.
    pub fn relocate_server_executable(&self, source: &Path) -> Result<PathBuf> {
        let Some((source_dir, identity)) = shadow::split_packaged_source(source) else {
            return Err(PbiLocateError::UnsupportedRelocationSource {
                path: source.display().to_string(),
            });
        };

        self.shadow_engine()?.copy(&source_dir, &identity)
    }

    /// Library resolution table scoped to the selected installation.
    pub fn library_resolver(&self) -> Result<LibraryResolver> {
        Ok(LibraryResolver::new(self.effective_install_dir()?))
    }
}
