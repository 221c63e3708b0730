// Certificate provisioning: download the proxy CA, convert it, name it the
// way Android's trust store expects and install it on a rooted device.

pub mod error;
pub mod fetch;
pub mod openssl;
pub mod provision;


pub use error::{CertError, CertResult, InstallError};
pub use fetch::{BurpFetcher, CertSource, DEFAULT_HOST, DEFAULT_PORT};
pub use openssl::{CertToolkit, OpenSsl};
pub use provision::{InstallRoute, ProvisionReport, Provisioner, parse_mount_point, staging_path};
