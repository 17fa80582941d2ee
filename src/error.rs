//! Error types for pbilocate
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! Per-entry catalog failures during discovery never become errors: they are
//! logged and the entry is skipped, so enumeration always completes. Only the
//! conditions a caller has to act on get a variant here.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for pbilocate operations
#[derive(Error, Diagnostic, Debug)]
pub enum PbiLocateError {
    #[error("No usable Power BI Desktop installation found")]
    #[diagnostic(
        code(pbilocate::discovery::no_usable_installation),
        help(
            "A 64-bit installation is required. Install Power BI Desktop, or point \
             PBILOCATE_INSTALL_DIR at an existing installation directory"
        )
    )]
    NoUsableInstallation,

    #[error("Relocation is not supported for: {path}")]
    #[diagnostic(
        code(pbilocate::shadow::unsupported_source),
        help(
            "Only Microsoft Store installs need (and support) relocation; other \
             channels run the engine in place"
        )
    )]
    UnsupportedRelocationSource { path: String },

    #[error("Server executable not found under: {install_dir}")]
    #[diagnostic(
        code(pbilocate::discovery::server_not_found),
        help("The installation may be corrupt, or a Store install may need 'pbilocate shadow-copy'")
    )]
    ServerExecutableNotFound { install_dir: String },

    #[error("Shadow copy failed for '{path}': {reason}")]
    #[diagnostic(code(pbilocate::shadow::copy_failed))]
    ShadowCopyFailed { path: String, reason: String },

    #[error("Could not determine the per-user data directory")]
    #[diagnostic(
        code(pbilocate::shadow::data_dir_unavailable),
        help("Set PBILOCATE_DATA_DIR to choose the shadow-copy cache location explicitly")
    )]
    DataDirUnavailable,

    #[error("IO error: {message}")]
    #[diagnostic(code(pbilocate::io::error))]
    IoError { message: String },
}

impl From<std::io::Error> for PbiLocateError {
    fn from(err: std::io::Error) -> Self {
        PbiLocateError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for PbiLocateError {
    fn from(err: serde_json::Error) -> Self {
        PbiLocateError::IoError {
            message: format!("JSON serialization failed: {}", err),
        }
    }
}

pub type Result<T> = miette::Result<T, PbiLocateError>;
