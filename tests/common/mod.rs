//! Common test utilities for pbilocate integration tests

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Full Store package identity used by the packaged-channel fixtures
#[allow(dead_code)]
pub const STORE_IDENTITY: &str =
    "Microsoft.MicrosoftPowerBIDesktop_2.91.884.0_x64__8wekyb3d8bbwe";

/// Minimal PE image: DOS magic, e_lfanew, PE magic, machine field
#[allow(dead_code)]
pub fn minimal_pe(machine: u16) -> Vec<u8> {
    let mut data = vec![0u8; 0x48];
    data[0] = b'M';
    data[1] = b'Z';
    data[0x3c..0x40].copy_from_slice(&0x40u32.to_le_bytes());
    data[0x40..0x44].copy_from_slice(b"PE\0\0");
    data[0x44..0x46].copy_from_slice(&machine.to_le_bytes());
    data
}

/// 64-bit PE image with a VS_FIXEDFILEINFO block carrying the given version
#[allow(dead_code)]
pub fn pe_with_version(major: u16, minor: u16, build: u16, revision: u16) -> Vec<u8> {
    let mut data = minimal_pe(0x8664);
    data.extend_from_slice(&0xfeef_04bdu32.to_le_bytes()); // dwSignature
    data.extend_from_slice(&0x0001_0000u32.to_le_bytes()); // dwStrucVersion
    let ms = (u32::from(major) << 16) | u32::from(minor);
    let ls = (u32::from(build) << 16) | u32::from(revision);
    data.extend_from_slice(&ms.to_le_bytes()); // file version
    data.extend_from_slice(&ls.to_le_bytes());
    data.extend_from_slice(&ms.to_le_bytes()); // product version
    data.extend_from_slice(&ls.to_le_bytes());
    data
}

/// A fake installation tree for integration tests
#[allow(dead_code)]
pub struct TestInstall {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to the installation root
    pub path: PathBuf,
}

impl TestInstall {
    /// Installation tree with a 64-bit main executable and the engine
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::with_main_executable(&pe_with_version(2, 91, 884, 0))
    }

    /// Installation tree with a caller-supplied main executable image
    #[allow(dead_code)]
    pub fn with_main_executable(image: &[u8]) -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();

        write_file(&path.join("bin").join("PBIDesktop.exe"), image);
        write_file(&path.join("bin").join("msmdsrv.exe"), b"engine");
        write_file(&path.join("bin").join("msmdsrv.ini"), b"config");
        write_file(
            &path.join("bin").join("Microsoft.AnalysisServices.Core.dll"),
            b"lib",
        );

        Self { temp, path }
    }

    /// Store-style tree: the same layout nested in an identity-named directory
    #[allow(dead_code)]
    pub fn packaged() -> (Self, PathBuf) {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        let install_dir = path.join(STORE_IDENTITY);

        write_file(
            &install_dir.join("bin").join("PBIDesktop.exe"),
            &pe_with_version(2, 91, 884, 0),
        );
        write_file(&install_dir.join("bin").join("msmdsrv.exe"), b"engine");
        write_file(
            &install_dir.join("bin").join("Microsoft.AnalysisServices.Core.dll"),
            b"lib",
        );

        (Self { temp, path }, install_dir)
    }

    /// Remove the engine so find-server has nothing to report
    #[allow(dead_code)]
    pub fn remove_engine(&self) {
        std::fs::remove_file(self.path.join("bin").join("msmdsrv.exe"))
            .expect("Failed to remove engine");
    }
}

fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    std::fs::write(path, content).expect("Failed to write file");
}
