use super::error::{CertError, CertResult};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tokio::process::Command;

// Certificate reformatting and Android store naming
#[allow(async_fn_in_trait)]
pub trait CertToolkit: Send + Sync {
    async fn der_to_pem(&self, der: &Path, pem: &Path) -> CertResult<()>;

    /// Legacy (pre-1.0 OpenSSL) subject hash, the file stem Android expects
    /// in `/system/etc/security/cacerts`.
    async fn subject_hash_old(&self, pem: &Path) -> CertResult<String>;
}

/// Client for the external `openssl` executable.
#[derive(Debug, Clone)]
pub struct OpenSsl {
    path: PathBuf,
}

impl OpenSsl {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn x509(&self, args: &[&OsStr]) -> CertResult<std::process::Output> {
        Command::new(&self.path)
            .arg("x509")
            .args(args)
            .output()
            .await
            .map_err(|source| CertError::ToolSpawn {
                tool: self.path.clone(),
                source,
            })
    }
}

impl CertToolkit for OpenSsl {
    async fn der_to_pem(&self, der: &Path, pem: &Path) -> CertResult<()> {
        let out = self
            .x509(&[
                OsStr::new("-inform"),
                OsStr::new("DER"),
                OsStr::new("-outform"),
                OsStr::new("PEM"),
                OsStr::new("-in"),
                der.as_os_str(),
                OsStr::new("-out"),
                pem.as_os_str(),
            ])
            .await?;
        if !out.status.success() {
            return Err(CertError::Conversion {
                der: der.to_path_buf(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        log::info!("Certificate converted successfully as {}", pem.display());
        Ok(())
    }

    async fn subject_hash_old(&self, pem: &Path) -> CertResult<String> {
        let out = self
            .x509(&[
                OsStr::new("-noout"),
                OsStr::new("-subject_hash_old"),
                OsStr::new("-in"),
                pem.as_os_str(),
            ])
            .await?;
        let hash = String::from_utf8_lossy(&out.stdout).trim().to_string();
        if !out.status.success() || hash.is_empty() {
            return Err(CertError::Extraction {
                pem: pem.to_path_buf(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        log::debug!("subject_hash_old of {} is {hash}", pem.display());
        Ok(hash)
    }
}
