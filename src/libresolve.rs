//! Library resolution table for the selected installation
//!
//! The engine's client libraries reference dependent libraries that are not on
//! any default search path once the engine runs from a shadow copy or an
//! unusual install dir. Instead of hooking a process-global resolution event,
//! the loading component holds one of these tables, scoped to the resolver it
//! came from, and consults it when a default-path lookup fails.
//!
//! Probing is read-only and results (hits and misses) are memoized, so calls
//! are cheap, reentrancy-safe, and callable from any thread.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;
use walkdir::WalkDir;

use crate::locator::BIN_DIR;

/// Resolves bare library names against one installation directory.
pub struct LibraryResolver {
    search_dir: PathBuf,
    cache: Mutex<HashMap<String, Option<PathBuf>>>,
}

impl LibraryResolver {
    pub fn new(search_dir: PathBuf) -> Self {
        Self {
            search_dir,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a library request to a file inside the installation.
    ///
    /// The request may carry qualifier metadata
    /// (`Name, Version=..., Culture=..., PublicKeyToken=...`); everything after
    /// the first comma is stripped. Returns `None` when no matching file
    /// exists, letting the caller's normal failure path proceed.
    pub fn resolve(&self, request: &str) -> Option<PathBuf> {
        let file_name = library_file_name(request)?;

        if let Ok(cache) = self.cache.lock() {
            if let Some(hit) = cache.get(&file_name) {
                return hit.clone();
            }
        }

        let found = self.probe(&file_name);
        debug!(request, found = ?found, "library probe");

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(file_name, found.clone());
        }
        found
    }

    /// Probe cheap locations first, then the whole tree.
    fn probe(&self, file_name: &str) -> Option<PathBuf> {
        for candidate in [
            self.search_dir.join(file_name),
            self.search_dir.join(BIN_DIR).join(file_name),
        ] {
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        WalkDir::new(&self.search_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file())
            .find(|e| {
                e.file_name()
                    .to_str()
                    .is_some_and(|n| n.eq_ignore_ascii_case(file_name))
            })
            .map(|e| e.path().to_path_buf())
    }
}

/// Strip qualifier metadata and produce the file name to look for.
fn library_file_name(request: &str) -> Option<String> {
    let bare = request.split(',').next()?.trim();
    if bare.is_empty() {
        return None;
    }
    if Path::new(bare)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("dll"))
    {
        Some(bare.to_string())
    } else {
        Some(format!("{bare}.dll"))
    }
}
