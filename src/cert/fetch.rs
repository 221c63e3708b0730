use super::error::{CertError, CertResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const DER_FILE_NAME: &str = "burp_cacert.der";

// Anything that can hand over a DER certificate on local disk
#[allow(async_fn_in_trait)]
pub trait CertSource: Send + Sync {
    async fn fetch(&self, dest_dir: &Path) -> CertResult<PathBuf>;
}

/// Downloads the CA certificate that Burp Suite serves on its proxy listener.
#[derive(Debug, Clone)]
pub struct BurpFetcher {
    host: String,
    port: u16,
    timeout: Duration,
}

impl BurpFetcher {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}/cert", self.host, self.port)
    }
}

impl Default for BurpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl CertSource for BurpFetcher {
    async fn fetch(&self, dest_dir: &Path) -> CertResult<PathBuf> {
        if !tokio::fs::try_exists(dest_dir).await.unwrap_or(false) {
            log::info!("Creating directory: {}", dest_dir.display());
            tokio::fs::create_dir_all(dest_dir)
                .await
                .map_err(|source| CertError::Io {
                    path: dest_dir.to_path_buf(),
                    source,
                })?;
        }

        let url = self.url();
        log::debug!("GET {url} (timeout {:?})", self.timeout);
        let network = |source| CertError::Network {
            url: url.clone(),
            source,
        };
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(network)?;
        let response = client.get(&url).send().await.map_err(network)?;
        if response.status() != reqwest::StatusCode::OK {
            return Err(CertError::HttpStatus {
                url: url.clone(),
                status: response.status().as_u16(),
            });
        }
        let body = response.bytes().await.map_err(network)?;

        let path = dest_dir.join(DER_FILE_NAME);
        tokio::fs::write(&path, &body)
            .await
            .map_err(|source| CertError::Io {
                path: path.clone(),
                source,
            })?;
        log::info!(
            "Certificate downloaded successfully as {} ({} bytes)",
            path.display(),
            body.len()
        );
        Ok(path)
    }
}
