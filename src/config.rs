use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ADB_PATH_ENV: &str = "ADB_PATH";
pub const OPENSSL_PATH_ENV: &str = "OPENSSL_PATH";
pub const CERT_DIR_ENV: &str = "CERT_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{tool} not found in {base:?}/bin or PATH (set {env} to override)")]
    ToolNotFound {
        tool: &'static str,
        env: &'static str,
        base: PathBuf,
    },
}

/// Paths resolved once at startup and handed to the clients.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolConfig {
    pub adb_path: PathBuf,
    pub openssl_path: PathBuf,
    pub cert_dir: PathBuf,
}

impl ToolConfig {
    /// Resolve from the process environment, relative to the executable's directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = base_dir();
        Ok(Self {
            adb_path: locate_tool(
                "adb",
                ADB_PATH_ENV,
                &base,
                std::env::var_os(ADB_PATH_ENV),
                std::env::var_os("PATH"),
            )?,
            openssl_path: locate_tool(
                "openssl",
                OPENSSL_PATH_ENV,
                &base,
                std::env::var_os(OPENSSL_PATH_ENV),
                std::env::var_os("PATH"),
            )?,
            cert_dir: std::env::var_os(CERT_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| base.join("certs")),
        })
    }

    pub fn with_cert_dir(mut self, cert_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = cert_dir {
            self.cert_dir = dir;
        }
        self
    }
}

fn base_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Find `tool`: explicit override, then `<base>/bin`, then each `PATH` entry.
/// The `.exe` name is tried alongside the plain one in every directory.
pub fn locate_tool(
    tool: &'static str,
    env: &'static str,
    base: &Path,
    override_path: Option<OsString>,
    path_var: Option<OsString>,
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = override_path.filter(|p| !p.is_empty()) {
        log::debug!("{tool} taken from {env}");
        return Ok(PathBuf::from(path));
    }

    let path_dirs: Vec<PathBuf> = path_var
        .as_deref()
        .map(|p| std::env::split_paths(p).collect())
        .unwrap_or_default();
    for dir in std::iter::once(base.join("bin")).chain(path_dirs) {
        for name in [tool.to_string(), format!("{tool}.exe")] {
            let candidate = dir.join(name);
            if candidate.is_file() {
                log::debug!("{tool} found at {}", candidate.display());
                return Ok(candidate);
            }
        }
    }

    Err(ConfigError::ToolNotFound {
        tool,
        env,
        base: base.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_override_wins() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("bin").join("adb"));
        let found = locate_tool(
            "adb",
            ADB_PATH_ENV,
            tmp.path(),
            Some("/opt/platform-tools/adb".into()),
            None,
        )
        .unwrap();
        assert_eq!(found, PathBuf::from("/opt/platform-tools/adb"));
    }

    #[test]
    fn test_local_bin_before_path() {
        let base = tempfile::tempdir().unwrap();
        let on_path = tempfile::tempdir().unwrap();
        touch(&base.path().join("bin").join("openssl"));
        touch(&on_path.path().join("openssl"));

        let found = locate_tool(
            "openssl",
            OPENSSL_PATH_ENV,
            base.path(),
            None,
            Some(on_path.path().as_os_str().to_owned()),
        )
        .unwrap();
        assert_eq!(found, base.path().join("bin").join("openssl"));
    }

    #[test]
    fn test_path_search_and_exe_suffix() {
        let base = tempfile::tempdir().unwrap();
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        touch(&second.path().join("adb.exe"));
        let path_var =
            std::env::join_paths([first.path(), second.path()]).unwrap();

        let found = locate_tool("adb", ADB_PATH_ENV, base.path(), Some("".into()), Some(path_var))
            .unwrap();
        assert_eq!(found, second.path().join("adb.exe"));
    }

    #[test]
    fn test_not_found() {
        let base = tempfile::tempdir().unwrap();
        let err = locate_tool("adb", ADB_PATH_ENV, base.path(), None, None).unwrap_err();
        assert!(err.to_string().contains("ADB_PATH"), "got {err}");
    }

    #[test]
    fn test_cert_dir_override() {
        let cfg = ToolConfig {
            adb_path: "adb".into(),
            openssl_path: "openssl".into(),
            cert_dir: "/base/certs".into(),
        };
        assert_eq!(cfg.clone().with_cert_dir(None).cert_dir, PathBuf::from("/base/certs"));
        assert_eq!(
            cfg.with_cert_dir(Some("/tmp/c".into())).cert_dir,
            PathBuf::from("/tmp/c")
        );
    }
}
