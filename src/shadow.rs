//! Shadow copy: relocating the engine out of a restricted install
//!
//! Store-channel binaries live under `WindowsApps`, where standard users can
//! read but not execute. The workaround is to copy the engine and its
//! qualifying dependencies into a per-user writable directory and run it from
//! there. The destination is keyed by the package identity segment of the
//! source path, so repeated relocations of the same install land in the same
//! place and overwrite in place.
//!
//! The copy is a plain sequence of file copies: no atomic rename, no rollback
//! on failure, and files left behind by an earlier version are never deleted.
//! A concurrent reader can observe a partially-copied tree.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;
use wax::{CandidatePath, Glob, Pattern};

use crate::error::{PbiLocateError, Result};
use crate::locator::{STORE_PACKAGE_PREFIX, server_relative_path};
use crate::progress::CopyProgress;

/// Overrides the default per-user cache root.
pub const DATA_DIR_ENV: &str = "PBILOCATE_DATA_DIR";

/// Tool subdirectory under the per-user local data dir.
const DATA_DIR: &str = "pbilocate";

/// What gets relocated, in match order: the engine itself with its config
/// files, every dependent library, and the provider cartridges. A file matched
/// by more than one pattern is copied once.
const INCLUDE_PATTERNS: &[&str] = &["**/msmdsrv*", "**/*.dll", "**/Cartridges/**"];

/// Root of the shadow-copy cache: `PBILOCATE_DATA_DIR` if set, otherwise the
/// platform's per-user local data dir plus a `pbilocate` subdirectory.
pub fn shadow_root() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    let base = dirs::data_local_dir().ok_or(PbiLocateError::DataDirUnavailable)?;
    Ok(base.join(DATA_DIR))
}

/// Cache directory for one installation identity.
pub fn shadow_dir(identity: &str) -> Result<PathBuf> {
    Ok(shadow_root()?.join(identity))
}

/// Split a path from a Store install into the install root and its identity.
///
/// The identity is the path segment starting with the package prefix, e.g.
/// `Microsoft.MicrosoftPowerBIDesktop_2.91.884.0_x64__8wekyb3d8bbwe`; the
/// returned root is the path up to and including that segment. `None` means
/// the path does not belong to the packaged-app channel.
pub fn split_packaged_source(path: &Path) -> Option<(PathBuf, String)> {
    let mut root = PathBuf::new();
    for component in path.components() {
        root.push(component);
        if let Some(name) = component.as_os_str().to_str() {
            if name.starts_with(STORE_PACKAGE_PREFIX) {
                return Some((root, name.to_string()));
            }
        }
    }
    None
}

/// Copies the qualifying file set of an installation into the cache.
pub struct ShadowCopyEngine {
    dest_root: PathBuf,
    show_progress: bool,
}

impl ShadowCopyEngine {
    pub fn new() -> Result<Self> {
        Ok(Self::with_root(shadow_root()?))
    }

    pub fn with_root(dest_root: PathBuf) -> Self {
        Self {
            dest_root,
            show_progress: false,
        }
    }

    /// Show a per-file progress bar during `copy`.
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    /// Copy the qualifying files of `source_dir` under `<root>/<identity>`,
    /// creating directories as needed and overwriting existing files. Returns
    /// the expected engine path inside the destination tree.
    ///
    /// A failure partway through leaves the files copied so far in place.
    pub fn copy(&self, source_dir: &Path, identity: &str) -> Result<PathBuf> {
        let dest_dir = self.dest_root.join(identity);

        // Relocating an already-relocated tree onto itself is a no-op
        if dest_dir == source_dir {
            return Ok(dest_dir.join(server_relative_path()));
        }

        if !source_dir.is_dir() {
            return Err(PbiLocateError::ShadowCopyFailed {
                path: source_dir.display().to_string(),
                reason: "source directory does not exist".to_string(),
            });
        }

        let files = collect_file_set(source_dir);
        let progress = self
            .show_progress
            .then(|| CopyProgress::new(files.len() as u64));

        for rel in &files {
            let source = source_dir.join(rel);
            let dest = dest_dir.join(rel);
            ensure_parent_dir(&dest)?;
            fs::copy(&source, &dest).map_err(|e| PbiLocateError::ShadowCopyFailed {
                path: rel.display().to_string(),
                reason: e.to_string(),
            })?;
            if let Some(ref pb) = progress {
                pb.tick(&rel.display().to_string());
            }
        }

        if let Some(pb) = progress {
            pb.finish();
        }
        debug!(
            count = files.len(),
            dest = %dest_dir.display(),
            "shadow copy complete"
        );

        Ok(dest_dir.join(server_relative_path()))
    }
}

/// Match the include patterns against the source tree, in pattern order,
/// de-duplicating files matched by more than one pattern. Paths are returned
/// relative to `source_dir`.
fn collect_file_set(source_dir: &Path) -> Vec<PathBuf> {
    let entries: Vec<(PathBuf, String)> = WalkDir::new(source_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let rel = e.path().strip_prefix(source_dir).ok()?.to_path_buf();
            // Normalize to forward slashes for platform-independent matching
            let slash = rel.to_string_lossy().replace('\\', "/");
            Some((rel, slash))
        })
        .collect();

    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut selected = Vec::new();

    for pattern in INCLUDE_PATTERNS {
        let Ok(glob) = Glob::new(pattern) else {
            warn!(pattern, "invalid include pattern, skipping");
            continue;
        };
        for (rel, slash) in &entries {
            if glob.matched(&CandidatePath::from(slash.as_str())).is_some()
                && seen.insert(rel.clone())
            {
                selected.push(rel.clone());
            }
        }
    }

    selected
}

/// Ensure parent directory exists for a path
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PbiLocateError::ShadowCopyFailed {
            path: parent.display().to_string(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn fake_engine_tree(root: &Path) {
        write(root, "bin/msmdsrv.exe", "engine");
        write(root, "bin/msmdsrv.ini", "config");
        write(root, "bin/msmdsrv.dll", "engine-lib");
        write(root, "bin/Microsoft.AnalysisServices.Core.dll", "lib");
        write(root, "bin/Cartridges/sql140.xsl", "cartridge");
        write(root, "bin/PBIDesktop.exe", "desktop");
        write(root, "readme.txt", "not copied");
    }

    #[test]
    fn test_file_set_matches_patterns_and_dedups() {
        let src = tempfile::tempdir().unwrap();
        fake_engine_tree(src.path());

        let files = collect_file_set(src.path());

        // msmdsrv.dll matches both "**/msmdsrv*" and "**/*.dll" but appears once
        let dll_count = files
            .iter()
            .filter(|p| p.file_name().unwrap() == "msmdsrv.dll")
            .count();
        assert_eq!(dll_count, 1);

        let names: Vec<String> = files
            .iter()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .collect();
        assert!(names.contains(&"bin/msmdsrv.exe".to_string()));
        assert!(names.contains(&"bin/msmdsrv.ini".to_string()));
        assert!(names.contains(&"bin/Microsoft.AnalysisServices.Core.dll".to_string()));
        assert!(names.contains(&"bin/Cartridges/sql140.xsl".to_string()));
        assert!(!names.contains(&"readme.txt".to_string()));
        assert!(!names.contains(&"bin/PBIDesktop.exe".to_string()));
    }

    #[test]
    fn test_pattern_order_is_preserved() {
        let src = tempfile::tempdir().unwrap();
        fake_engine_tree(src.path());

        let files = collect_file_set(src.path());
        let first_engine = files
            .iter()
            .position(|p| p.ends_with("msmdsrv.exe"))
            .unwrap();
        let first_plain_dll = files
            .iter()
            .position(|p| p.ends_with("Microsoft.AnalysisServices.Core.dll"))
            .unwrap();
        assert!(first_engine < first_plain_dll);
    }

    #[test]
    fn test_copy_reroots_and_returns_engine_path() {
        let src = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        fake_engine_tree(src.path());

        let engine = ShadowCopyEngine::with_root(cache.path().to_path_buf());
        let server = engine.copy(src.path(), "identity-a").unwrap();

        let dest = cache.path().join("identity-a");
        assert_eq!(server, dest.join("bin").join("msmdsrv.exe"));
        assert!(server.is_file());
        assert_eq!(
            fs::read_to_string(dest.join("bin/Cartridges/sql140.xsl")).unwrap(),
            "cartridge"
        );
        assert!(!dest.join("readme.txt").exists());
    }

    #[test]
    fn test_copy_is_idempotent_in_content() {
        let src = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        fake_engine_tree(src.path());

        let engine = ShadowCopyEngine::with_root(cache.path().to_path_buf());
        engine.copy(src.path(), "id").unwrap();
        let before = fs::read(cache.path().join("id/bin/msmdsrv.exe")).unwrap();
        engine.copy(src.path(), "id").unwrap();
        let after = fs::read(cache.path().join("id/bin/msmdsrv.exe")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_copy_overwrites_changed_files_but_keeps_stale_ones() {
        let src = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        fake_engine_tree(src.path());

        let engine = ShadowCopyEngine::with_root(cache.path().to_path_buf());
        engine.copy(src.path(), "id").unwrap();

        // Simulate an upgrade: one file changes, one disappears
        write(src.path(), "bin/msmdsrv.exe", "engine v2");
        fs::remove_file(src.path().join("bin/msmdsrv.dll")).unwrap();
        engine.copy(src.path(), "id").unwrap();

        let dest = cache.path().join("id");
        assert_eq!(
            fs::read_to_string(dest.join("bin/msmdsrv.exe")).unwrap(),
            "engine v2"
        );
        // Stale file from the earlier copy is left in place
        assert!(dest.join("bin/msmdsrv.dll").is_file());
    }

    #[test]
    fn test_copy_missing_source_fails() {
        let cache = tempfile::tempdir().unwrap();
        let engine = ShadowCopyEngine::with_root(cache.path().to_path_buf());
        let err = engine
            .copy(Path::new("/nowhere/at/all"), "id")
            .unwrap_err();
        assert!(matches!(err, PbiLocateError::ShadowCopyFailed { .. }));
    }

    #[test]
    fn test_copy_onto_itself_is_a_noop() {
        let cache = tempfile::tempdir().unwrap();
        let engine = ShadowCopyEngine::with_root(cache.path().to_path_buf());
        let dest = cache.path().join("id");
        let server = engine.copy(&dest, "id").unwrap();
        assert_eq!(server, dest.join("bin").join("msmdsrv.exe"));
    }

    #[test]
    fn test_split_packaged_source() {
        let path = Path::new(
            "/apps/WindowsApps/Microsoft.MicrosoftPowerBIDesktop_2.91.884.0_x64__8wekyb3d8bbwe/bin/msmdsrv.exe",
        );
        let (root, identity) = split_packaged_source(path).unwrap();
        assert_eq!(
            identity,
            "Microsoft.MicrosoftPowerBIDesktop_2.91.884.0_x64__8wekyb3d8bbwe"
        );
        assert!(root.ends_with(&identity));

        assert!(split_packaged_source(Path::new("/opt/powerbi/bin/msmdsrv.exe")).is_none());
    }
}
