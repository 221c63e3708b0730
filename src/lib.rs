pub mod adb;
pub mod args;
pub mod cert;
pub mod config;

pub use adb::AdbShell;
pub use cert::Provisioner;
pub use config::ToolConfig;
