use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for ADB operations.
pub type AdbResult<T> = Result<T, AdbError>;

/// The error type for all ADB-related operations.
#[derive(Debug, Error)]
pub enum AdbError {
    #[error(
        "'adb' binary not usable at {path:?}: {reason}. Install Android Platform Tools (https://developer.android.com/tools/adb), put it in ./bin or set ADB_PATH."
    )]
    BinaryNotFound { path: PathBuf, reason: String },

    #[error("Failed to run adb {command}: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("adb {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("No devices available. Connect a device and authorize USB debugging.")]
    NoDevices,
}

impl AdbError {
    /// Check if this error means the adb executable itself is missing or broken
    pub fn is_missing_binary(&self) -> bool {
        match self {
            AdbError::BinaryNotFound { .. } => true,
            AdbError::Spawn { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
