// ADB module - thin client over the external `adb` executable.
// Device listing, property queries, shell passthrough and the privileged
// operations used to install certificates.

pub mod error;
pub mod shell;
pub mod types;

// Re-export the main types and functions for easy access
pub use error::{AdbError, AdbResult};
pub use shell::{AdbShell, shell_quote};
pub use types::{Bridge, Device, DeviceInfo, ShellOutput};
