use super::error::{CertResult, InstallError};
use super::fetch::CertSource;
use super::openssl::CertToolkit;
use crate::adb::{AdbResult, Bridge, shell_quote};
use std::path::{Path, PathBuf};

pub const PEM_FILE_NAME: &str = "burp_cacert.pem";
pub const STAGING_DIR: &str = "/data/local/tmp";
pub const SYSTEM_CACERTS_DIR: &str = "/system/etc/security/cacerts/";

const MOUNTS_QUERY: &str = "cat /proc/mounts | grep -i ' / '";

/// Where a certificate with the given subject hash is staged on the device.
pub fn staging_path(subject_hash: &str) -> String {
    format!("{STAGING_DIR}/{subject_hash}.0")
}

/// Mount point from a `/proc/mounts` line: the first whitespace-separated
/// field of the first non-empty line.
pub fn parse_mount_point(mounts: &str) -> Option<&str> {
    mounts
        .lines()
        .find(|line| !line.trim().is_empty())
        .and_then(|line| line.split_whitespace().next())
}

fn install_command(staging: &str) -> String {
    format!("mount -o rw,remount /system && {}", move_command(staging))
}

fn move_command(staging: &str) -> String {
    format!("mv {} {SYSTEM_CACERTS_DIR}", shell_quote(staging))
}

fn remount_command(mount_point: &str) -> String {
    format!("mount -o rw,remount {}", shell_quote(mount_point))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Converting,
    HashExtraction,
    Pushing,
    Installing,
    MountLookup,
    Remounting,
    ReInstalling,
    CleaningUp,
    Done,
}

/// How the certificate reached the system store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallRoute {
    /// `/system` remount and move in a single privileged call.
    Direct,
    /// Root mount point remounted explicitly, then moved.
    Remounted { mount_point: String },
}

#[derive(Debug)]
pub struct ProvisionReport {
    pub device: String,
    pub subject_hash: String,
    pub staging_path: String,
    /// A failed push is reported here; the install is still attempted.
    pub push: AdbResult<String>,
    pub install: Result<InstallRoute, InstallError>,
}

impl ProvisionReport {
    pub fn installed(&self) -> bool {
        self.install.is_ok()
    }

    pub fn final_path(&self) -> String {
        format!("{SYSTEM_CACERTS_DIR}{}.0", self.subject_hash)
    }
}

/// Runs one download → convert → push → install → cleanup cycle per call.
pub struct Provisioner<B, T, S> {
    bridge: B,
    toolkit: T,
    source: S,
    cert_dir: PathBuf,
}

impl<B: Bridge, T: CertToolkit, S: CertSource> Provisioner<B, T, S> {
    pub fn new(bridge: B, toolkit: T, source: S, cert_dir: impl Into<PathBuf>) -> Self {
        Self {
            bridge,
            toolkit,
            source,
            cert_dir: cert_dir.into(),
        }
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn toolkit(&self) -> &T {
        &self.toolkit
    }

    /// Install the proxy CA certificate on `device`.
    ///
    /// Download, conversion and hash extraction errors abort the run and
    /// are returned as `Err`. Everything after that, including a failed
    /// push or an exhausted remount fallback, ends in a [`ProvisionReport`].
    /// Local artifacts are removed on every path that created them.
    pub async fn provision(&self, device: &str) -> CertResult<ProvisionReport> {
        enter(Stage::Fetching);
        let der = self.source.fetch(&self.cert_dir).await?;
        let pem = self.cert_dir.join(PEM_FILE_NAME);

        let subject_hash = match self.prepare(&der, &pem).await {
            Ok(hash) => hash,
            Err(e) => {
                log::error!("{e}");
                cleanup(&[der.as_path(), pem.as_path()]).await;
                return Err(e);
            }
        };

        enter(Stage::Pushing);
        let staging = staging_path(&subject_hash);
        let push = self.bridge.push(device, &pem, &staging).await;
        match &push {
            Ok(_) => log::info!("Pushed certificate to {staging}"),
            Err(e) => log::error!("Push to {staging} failed, trying install anyway: {e}"),
        }

        let install = self.install(device, &staging).await;
        match &install {
            Ok(route) => log::info!("Installed certificate on the device ({route:?})"),
            Err(e) => log::error!("{e}"),
        }

        cleanup(&[der.as_path(), pem.as_path()]).await;
        enter(Stage::Done);

        Ok(ProvisionReport {
            device: device.to_string(),
            subject_hash,
            staging_path: staging,
            push,
            install,
        })
    }

    async fn prepare(&self, der: &Path, pem: &Path) -> CertResult<String> {
        enter(Stage::Converting);
        self.toolkit.der_to_pem(der, pem).await?;
        enter(Stage::HashExtraction);
        self.toolkit.subject_hash_old(pem).await
    }

    async fn install(&self, device: &str, staging: &str) -> Result<InstallRoute, InstallError> {
        enter(Stage::Installing);
        let first = self
            .bridge
            .su_shell(device, &install_command(staging))
            .await?;
        if first.success() {
            return Ok(InstallRoute::Direct);
        }
        log::warn!("Install failed: {}", first.stderr.trim());
        log::info!("Trying to remount the file system");

        enter(Stage::MountLookup);
        let mounts = self.bridge.su_shell(device, MOUNTS_QUERY).await?;
        let mount_point = parse_mount_point(&mounts.stdout)
            .ok_or(InstallError::MountPointNotFound)?
            .to_string();
        log::info!("Found the mount point: {mount_point}");

        enter(Stage::Remounting);
        let remount = self
            .bridge
            .su_shell(device, &remount_command(&mount_point))
            .await?;
        if !remount.success() {
            return Err(InstallError::Remount {
                mount_point,
                stderr: remount.stderr.trim().to_string(),
            });
        }
        log::info!("Remounted the file system");

        enter(Stage::ReInstalling);
        let retry = self.bridge.su_shell(device, &move_command(staging)).await?;
        if !retry.success() {
            return Err(InstallError::Install {
                stderr: retry.stderr.trim().to_string(),
            });
        }
        Ok(InstallRoute::Remounted { mount_point })
    }
}

fn enter(stage: Stage) {
    log::info!("[{stage:?}]");
}

// Best-effort: a file that cannot be removed is only worth a warning
async fn cleanup(paths: &[&Path]) {
    enter(Stage::CleaningUp);
    for path in paths {
        match tokio::fs::remove_file(path).await {
            Ok(()) => log::debug!("Removed {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Could not remove {}: {e}", path.display()),
        }
    }
}
