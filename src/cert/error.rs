use crate::adb::AdbError;
use std::path::PathBuf;
use thiserror::Error;

pub type CertResult<T> = Result<T, CertError>;

/// Failures that abort a provisioning run before the device is touched.
#[derive(Debug, Error)]
pub enum CertError {
    #[error("Error downloading certificate from {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("Failed to download certificate from {url}. Status code: {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to convert certificate {der:?} to PEM: {stderr}")]
    Conversion { der: PathBuf, stderr: String },

    #[error("Failed to extract old subject hash from {pem:?}: {stderr}")]
    Extraction { pem: PathBuf, stderr: String },

    #[error("Failed to run {tool:?}: {source}")]
    ToolSpawn {
        tool: PathBuf,
        source: std::io::Error,
    },
}

/// Why the certificate did not end up in the system store.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Installing certificate failed: {stderr}")]
    Install { stderr: String },

    #[error("Could not find the mount point")]
    MountPointNotFound,

    #[error("Remounting {mount_point} failed: {stderr}")]
    Remount { mount_point: String, stderr: String },

    #[error("Bridge call failed during install: {0}")]
    Bridge(#[from] AdbError),
}
