use super::error::{AdbError, AdbResult};
use super::types::{Bridge, Device, DeviceInfo, ShellOutput};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Client for the external `adb` executable.
///
/// Every call spawns `adb` with an argument vector; nothing goes through a
/// host shell. Commands destined for the device shell are quoted with
/// [`shell_quote`] because `adb shell` joins its arguments into one line.
#[derive(Debug, Clone)]
pub struct AdbShell {
    adb_path: PathBuf,
}

impl AdbShell {
    pub fn new(adb_path: impl Into<PathBuf>) -> Self {
        Self {
            adb_path: adb_path.into(),
        }
    }

    pub async fn ensure_available(&self) -> AdbResult<()> {
        match Command::new(&self.adb_path).arg("version").output().await {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => Err(AdbError::BinaryNotFound {
                path: self.adb_path.clone(),
                reason: format!("'adb version' returned non-zero ({})", out.status),
            }),
            Err(e) => Err(AdbError::BinaryNotFound {
                path: self.adb_path.clone(),
                reason: e.to_string(),
            }),
        }
    }

    pub async fn start_server(&self) -> AdbResult<()> {
        // Output is irrelevant, the server prints a banner on first start
        let out = self.output(["start-server"]).await?;
        if !out.status.success() {
            log::warn!(
                "adb start-server exited with {}: {}",
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            );
        }
        Ok(())
    }

    pub fn parse_devices(output: &str) -> Vec<Device> {
        output
            .lines()
            .map(str::trim)
            .filter(|line| {
                !line.is_empty() && !line.starts_with("List of devices") && !line.starts_with('*')
            })
            .filter_map(|line| {
                let mut parts = line.split_whitespace();
                let name = parts.next()?.to_string();
                let state = parts.next().unwrap_or("unknown").to_string();
                let mut transport_id = None;
                let mut model = None;
                for part in parts {
                    if let Some(tid) = part.strip_prefix("transport_id:") {
                        transport_id = Some(tid.to_string());
                    } else if let Some(m) = part.strip_prefix("model:") {
                        model = Some(m.to_string());
                    }
                }
                Some(Device {
                    name,
                    state,
                    transport_id,
                    model,
                })
            })
            .collect()
    }

    pub async fn list_devices(&self) -> AdbResult<Vec<Device>> {
        let stdout = self.checked(["devices", "-l"]).await?;
        Ok(Self::parse_devices(&stdout))
    }

    /// First attached device that is authorized and online.
    pub async fn first_ready_device(&self) -> AdbResult<Device> {
        self.list_devices()
            .await?
            .into_iter()
            .find(Device::is_ready)
            .ok_or(AdbError::NoDevices)
    }

    pub async fn get_state(&self, device: &str) -> AdbResult<String> {
        let stdout = self.checked(["-s", device, "get-state"]).await?;
        Ok(stdout.trim().to_string())
    }

    pub async fn serial(&self, device: &str) -> AdbResult<String> {
        let stdout = self.checked(["-s", device, "get-serialno"]).await?;
        Ok(stdout.trim().to_string())
    }

    pub async fn getprop(&self, device: &str, prop: &str) -> AdbResult<String> {
        let stdout = self.checked(["-s", device, "shell", "getprop", prop]).await?;
        Ok(stdout.trim().to_string())
    }

    pub async fn device_info(&self, device: &str) -> AdbResult<DeviceInfo> {
        Ok(DeviceInfo {
            manufacturer: self.getprop(device, "ro.product.manufacturer").await?,
            model: self.getprop(device, "ro.product.model").await?,
            serial: self.serial(device).await?,
            android_version: self.getprop(device, "ro.build.version.release").await?,
            sdk_version: self.getprop(device, "ro.build.version.sdk").await?,
        })
    }

    /// Run `command` in the device shell as the shell user.
    pub async fn shell(&self, device: &str, command: &str) -> AdbResult<ShellOutput> {
        let out = self.output(["-s", device, "shell", command]).await?;
        Ok(ShellOutput::from_output(out))
    }

    pub async fn push_file(&self, device: &str, local: &Path, remote: &str) -> AdbResult<String> {
        let mut cmd = Command::new(&self.adb_path);
        cmd.args(["-s", device, "push"]).arg(local).arg(remote);
        let out = cmd.output().await.map_err(|source| AdbError::Spawn {
            command: "push".into(),
            source,
        })?;
        if !out.status.success() {
            return Err(AdbError::CommandFailed {
                command: format!("push {} {remote}", local.display()),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
    }

    pub async fn su_shell(&self, device: &str, command: &str) -> AdbResult<ShellOutput> {
        log::debug!("su -c {command:?} on {device}");
        let quoted = shell_quote(command);
        let out = self
            .output(["-s", device, "shell", "su", "-c", quoted.as_str()])
            .await?;
        Ok(ShellOutput::from_output(out))
    }

    async fn output<I, S>(&self, args: I) -> AdbResult<std::process::Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<S> = args.into_iter().collect();
        Command::new(&self.adb_path)
            .args(&args)
            .output()
            .await
            .map_err(|source| AdbError::Spawn {
                command: describe(&args),
                source,
            })
    }

    // Run and require a zero exit status, returning stdout
    async fn checked<I, S>(&self, args: I) -> AdbResult<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<S> = args.into_iter().collect();
        let out = self.output(&args).await?;
        if !out.status.success() {
            return Err(AdbError::CommandFailed {
                command: describe(&args),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }
}

impl Bridge for AdbShell {
    async fn push(&self, device: &str, local: &Path, remote: &str) -> AdbResult<String> {
        self.push_file(device, local, remote).await
    }

    async fn su_shell(&self, device: &str, command: &str) -> AdbResult<ShellOutput> {
        AdbShell::su_shell(self, device, command).await
    }
}

/// Quote `s` as a single word for a POSIX `sh` on the device.
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

fn describe<S: AsRef<OsStr>>(args: &[S]) -> String {
    args.iter()
        .map(|a| a.as_ref().to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
