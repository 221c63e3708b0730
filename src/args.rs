use crate::cert::{DEFAULT_HOST, DEFAULT_PORT};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Devices,
    Info {
        device: Option<String>,
    },
    Run {
        device: Option<String>,
        command: String,
    },
    InstallCert {
        device: Option<String>,
        host: String,
        port: u16,
        cert_dir: Option<PathBuf>,
    },
}

#[derive(Debug, PartialEq)]
pub struct Args {
    pub command: Command,
    pub debug_mode: bool,
}

/// What the command line asked for.
#[derive(Debug, PartialEq)]
pub enum Parsed {
    Run(Args),
    Help,
    Version,
}

impl Args {
    /// Parse everything after the program name.
    pub fn try_parse_from<I, S>(args: I) -> Result<Parsed, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::<String>::into);
        let mut debug_mode = false;
        let mut subcommand: Option<String> = None;

        let mut device: Option<String> = None;
        let mut command: Option<String> = None;
        let mut host = DEFAULT_HOST.to_string();
        let mut port = DEFAULT_PORT;
        let mut cert_dir: Option<PathBuf> = None;
        let mut seen: Vec<&'static str> = Vec::new();

        while let Some(arg) = args.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((f, v)) if f.starts_with('-') => (f.to_string(), Some(v.to_string())),
                _ => (arg.clone(), None),
            };
            let mut value = |name: &str| -> Result<String, String> {
                inline
                    .clone()
                    .or_else(|| args.next())
                    .ok_or_else(|| format!("Missing value for {name}"))
            };

            match flag.as_str() {
                "--help" | "-h" => return Ok(Parsed::Help),
                "--version" | "-v" => return Ok(Parsed::Version),
                "--debug" => debug_mode = true,
                "--device" | "-d" => {
                    device = Some(value("--device")?);
                    seen.push("--device");
                }
                "--command" | "-c" => {
                    command = Some(value("--command")?);
                    seen.push("--command");
                }
                "--host" | "-u" => {
                    host = value("--host")?;
                    seen.push("--host");
                }
                "--port" | "-p" => {
                    seen.push("--port");
                    let raw = value("--port")?;
                    port = raw
                        .parse::<u16>()
                        .map_err(|_| format!("Invalid port value: {raw}"))?;
                }
                "--cert-dir" => {
                    cert_dir = Some(PathBuf::from(value("--cert-dir")?));
                    seen.push("--cert-dir");
                }
                // Accepted for compatibility with `tool adb <subcommand>` invocations
                "adb" if subcommand.is_none() => {}
                "devices" | "info" | "run" | "install-cert" if subcommand.is_none() => {
                    subcommand = Some(flag.clone())
                }
                _ => return Err(format!("Unknown argument: {arg}")),
            }
        }

        if let Some(name) = subcommand.as_deref() {
            let allowed = allowed_options(name);
            if let Some(flag) = seen.iter().copied().find(|f| !allowed.contains(f)) {
                return Err(format!("{flag} is not valid for {name}"));
            }
        }

        // Empty device means "pick one", as with an omitted flag
        let device = device.filter(|d| !d.is_empty());
        let command = match subcommand.as_deref() {
            Some("devices") => Command::Devices,
            Some("info") => Command::Info { device },
            Some("run") => Command::Run {
                device,
                command: command.ok_or("run requires --command")?,
            },
            Some("install-cert") => Command::InstallCert {
                device,
                host,
                port,
                cert_dir,
            },
            _ => return Ok(Parsed::Help),
        };

        Ok(Parsed::Run(Args {
            command,
            debug_mode,
        }))
    }
}

fn allowed_options(subcommand: &str) -> &'static [&'static str] {
    match subcommand {
        "info" => &["--device"],
        "run" => &["--device", "--command"],
        "install-cert" => &["--device", "--host", "--port", "--cert-dir"],
        _ => &[],
    }
}

pub fn print_version() {
    println!(
        "Android ADB Cert v{} ({})",
        env!("APP_VERSION_DISPLAY"),
        env!("APP_BUILD_YEAR")
    );
}

pub fn print_help() {
    println!("🤖 Android ADB Certificate Tool");
    println!();
    println!("USAGE:");
    println!("    android-adb-cert [--debug] <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    devices             List all connected devices");
    println!("    info                Show model, serial and Android version of a device");
    println!("    run                 Run a shell command on a device");
    println!("    install-cert        Install the Burp CA certificate on a rooted device");
    println!();
    println!("OPTIONS:");
    println!("    -d, --device ID     Device to use (default: first connected device)");
    println!("    -c, --command CMD   Shell command for 'run'");
    println!("    -u, --host HOST     Host where Burp Suite is running (default: {DEFAULT_HOST})");
    println!("    -p, --port PORT     Port where Burp Suite is running (default: {DEFAULT_PORT})");
    println!("    --cert-dir DIR      Working directory for downloaded certificates");
    println!("    --debug             Enable debug logging (or set RUST_LOG)");
    println!("    --help, -h          Show this help message");
    println!("    --version, -v       Show version information");
    println!();
    println!("ENVIRONMENT:");
    println!("    ADB_PATH, OPENSSL_PATH  Override tool discovery (./bin, then PATH)");
    println!("    CERT_DIR                Default certificate working directory");
    println!();
    println!("EXAMPLES:");
    println!("    android-adb-cert devices");
    println!("    android-adb-cert run -d emulator-5554 -c 'id'");
    println!("    android-adb-cert install-cert --host 192.168.1.10 --port=8081");
}
