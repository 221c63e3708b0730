// Core ADB types and the bridge trait used by certificate provisioning
use super::error::AdbResult;
use std::path::Path;

#[derive(Debug, PartialEq, Clone)]
pub struct Device {
    pub name: String,
    pub state: String, // "device", "unauthorized", "offline", ...
    pub transport_id: Option<String>,
    pub model: Option<String>,
}

impl Device {
    pub fn is_ready(&self) -> bool {
        self.state == "device"
    }
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct DeviceInfo {
    pub manufacturer: String,
    pub model: String,
    pub serial: String,
    pub android_version: String,
    pub sdk_version: String,
}

impl std::fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Name: {} {} SDK-{}",
            self.manufacturer, self.model, self.sdk_version
        )?;
        writeln!(f, "Serial: {}", self.serial)?;
        write!(f, "Android Version: {}", self.android_version)
    }
}

/// Captured result of a shell invocation that is allowed to exit non-zero.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShellOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ShellOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub(crate) fn from_output(output: std::process::Output) -> Self {
        Self {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

// Device operations the certificate provisioner needs
#[allow(async_fn_in_trait)]
pub trait Bridge: Send + Sync {
    /// Copy a local file onto the device. Fails if the transfer reports an error.
    async fn push(&self, device: &str, local: &Path, remote: &str) -> AdbResult<String>;

    /// Run `command` under `su` on the device. A non-zero exit status is not
    /// an error here; only a failure to invoke the bridge is.
    async fn su_shell(&self, device: &str, command: &str) -> AdbResult<ShellOutput>;
}
