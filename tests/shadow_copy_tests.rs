//! Integration tests for the shadow-copy command
//!
//! PBILOCATE_DATA_DIR redirects the cache into a temp dir so tests never touch
//! the real per-user location. The --source form is exercised directly since it
//! skips discovery and works from the path alone.

mod common;

use assert_cmd::Command;
use common::{STORE_IDENTITY, TestInstall};
use predicates::prelude::*;

// Temporary fix for deprecated cargo_bin - will be updated when build-dir issues are resolved
#[allow(deprecated)]
fn pbilocate_cmd() -> Command {
    let mut cmd = Command::cargo_bin("pbilocate").unwrap();
    cmd.env_remove("PBILOCATE_INSTALL_DIR");
    cmd.env_remove("PBILOCATE_DATA_DIR");
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_shadow_copy_relocates_engine_and_dependencies() {
    let (_install, install_dir) = TestInstall::packaged();
    let cache = tempfile::tempdir().unwrap();
    let source = install_dir.join("bin").join("msmdsrv.exe");

    pbilocate_cmd()
        .env("PBILOCATE_DATA_DIR", cache.path())
        .args(["shadow-copy", "--source"])
        .arg(&source)
        .assert()
        .success()
        .stdout(predicate::str::contains(STORE_IDENTITY))
        .stdout(predicate::str::contains("msmdsrv.exe"));

    let dest = cache.path().join(STORE_IDENTITY).join("bin");
    assert!(dest.join("msmdsrv.exe").is_file());
    assert!(dest.join("Microsoft.AnalysisServices.Core.dll").is_file());
    // The main executable does not qualify for relocation
    assert!(!dest.join("PBIDesktop.exe").exists());
}

#[test]
fn test_shadow_copy_twice_is_idempotent() {
    let (_install, install_dir) = TestInstall::packaged();
    let cache = tempfile::tempdir().unwrap();
    let source = install_dir.join("bin").join("msmdsrv.exe");

    for _ in 0..2 {
        pbilocate_cmd()
            .env("PBILOCATE_DATA_DIR", cache.path())
            .args(["shadow-copy", "--source"])
            .arg(&source)
            .assert()
            .success();
    }

    let engine = cache.path().join(STORE_IDENTITY).join("bin").join("msmdsrv.exe");
    assert_eq!(std::fs::read(engine).unwrap(), b"engine");
}

#[test]
fn test_shadow_copy_rejects_non_packaged_source() {
    let install = TestInstall::new();
    let cache = tempfile::tempdir().unwrap();
    let source = install.path.join("bin").join("msmdsrv.exe");

    pbilocate_cmd()
        .env("PBILOCATE_DATA_DIR", cache.path())
        .args(["shadow-copy", "--source"])
        .arg(&source)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Relocation is not supported"));

    // Nothing was written to the cache
    assert_eq!(std::fs::read_dir(cache.path()).unwrap().count(), 0);
}

#[test]
fn test_shadow_copy_survives_stale_files_in_cache() {
    let (_install, install_dir) = TestInstall::packaged();
    let cache = tempfile::tempdir().unwrap();
    let source = install_dir.join("bin").join("msmdsrv.exe");

    // A leftover from an earlier version's relocation
    let stale = cache.path().join(STORE_IDENTITY).join("bin").join("old.dll");
    std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
    std::fs::write(&stale, b"obsolete").unwrap();

    pbilocate_cmd()
        .env("PBILOCATE_DATA_DIR", cache.path())
        .args(["shadow-copy", "--source"])
        .arg(&source)
        .assert()
        .success();

    // Relocation never deletes, so the stale file is still there
    assert!(stale.is_file());
    assert!(
        cache
            .path()
            .join(STORE_IDENTITY)
            .join("bin")
            .join("msmdsrv.exe")
            .is_file()
    );
}

#[cfg(not(windows))]
#[test]
fn test_shadow_copy_without_source_needs_an_installation() {
    let cache = tempfile::tempdir().unwrap();

    pbilocate_cmd()
        .env("PBILOCATE_DATA_DIR", cache.path())
        .arg("shadow-copy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No usable"));
}
