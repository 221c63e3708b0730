use android_adb_cert::adb::{AdbError, AdbShell};
use android_adb_cert::args::{self, Args, Command, Parsed};
use android_adb_cert::cert::{BurpFetcher, OpenSsl, Provisioner};
use android_adb_cert::config::ToolConfig;
use std::process::ExitCode;

// Provisioning ran to the end but the certificate is not in the system store
const EXIT_NOT_INSTALLED: u8 = 2;

fn main() -> ExitCode {
    let args = match Args::try_parse_from(std::env::args().skip(1)) {
        Ok(Parsed::Run(args)) => args,
        Ok(Parsed::Help) => {
            args::print_help();
            return ExitCode::SUCCESS;
        }
        Ok(Parsed::Version) => {
            args::print_version();
            return ExitCode::SUCCESS;
        }
        Err(msg) => {
            eprintln!("❌ {msg}");
            args::print_help();
            return ExitCode::FAILURE;
        }
    };

    let default_level = if args.debug_mode { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let config = match ToolConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("❌ {e}");
            return ExitCode::FAILURE;
        }
    };
    log::debug!("{config:?}");

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("❌ Failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };
    rt.block_on(run(args.command, config))
}

async fn run(command: Command, config: ToolConfig) -> ExitCode {
    let adb = AdbShell::new(&config.adb_path);
    if let Err(e) = adb.ensure_available().await {
        eprintln!("❌ {e}");
        return ExitCode::FAILURE;
    }
    if let Err(e) = adb.start_server().await {
        eprintln!("❌ {e}");
        return ExitCode::FAILURE;
    }

    let result = match command {
        Command::Devices => list_devices(&adb).await,
        Command::Info { device } => show_info(&adb, device).await,
        Command::Run { device, command } => run_shell(&adb, device, &command).await,
        Command::InstallCert {
            device,
            host,
            port,
            cert_dir,
        } => {
            let config = config.with_cert_dir(cert_dir);
            return install_cert(adb, &config, device, host, port).await;
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {e}");
            ExitCode::FAILURE
        }
    }
}

async fn resolve_device(adb: &AdbShell, device: Option<String>) -> Result<String, AdbError> {
    match device {
        Some(name) => Ok(name),
        None => {
            let first = adb.first_ready_device().await?;
            log::info!("Using first connected device: {}", first.name);
            Ok(first.name)
        }
    }
}

async fn list_devices(adb: &AdbShell) -> Result<ExitCode, AdbError> {
    let devices = adb.list_devices().await?;
    println!("📱 Connected devices: {}", devices.len());
    for device in &devices {
        let model = device.model.as_deref().unwrap_or("-");
        let icon = if device.is_ready() { "✅" } else { "⚠️" };
        println!(" {icon} {}\t{}\t{model}", device.name, device.state);
    }
    Ok(ExitCode::SUCCESS)
}

async fn show_info(adb: &AdbShell, device: Option<String>) -> Result<ExitCode, AdbError> {
    let device = resolve_device(adb, device).await?;
    let state = adb.get_state(&device).await?;
    let info = adb.device_info(&device).await?;
    println!("📱 Device Info ({device}, {state})");
    println!("{info}");
    Ok(ExitCode::SUCCESS)
}

async fn run_shell(
    adb: &AdbShell,
    device: Option<String>,
    command: &str,
) -> Result<ExitCode, AdbError> {
    let device = resolve_device(adb, device).await?;
    let out = adb.shell(&device, command).await?;
    if !out.success() {
        eprintln!("❌ [Error] {}", out.stderr.trim());
        return Ok(ExitCode::FAILURE);
    }
    println!("{}", out.stdout.trim_end());
    Ok(ExitCode::SUCCESS)
}

async fn install_cert(
    adb: AdbShell,
    config: &ToolConfig,
    device: Option<String>,
    host: String,
    port: u16,
) -> ExitCode {
    let device = match resolve_device(&adb, device).await {
        Ok(d) => d,
        Err(e) => {
            eprintln!("❌ {e}");
            return ExitCode::FAILURE;
        }
    };

    let fetcher = BurpFetcher::new(host, port);
    println!("🔐 Installing Burp CA from {} on {device}", fetcher.url());
    let provisioner = Provisioner::new(
        adb,
        OpenSsl::new(&config.openssl_path),
        fetcher,
        &config.cert_dir,
    );

    let report = match provisioner.provision(&device).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("❌ {e}");
            return ExitCode::FAILURE;
        }
    };

    match &report.push {
        Ok(_) => println!("✅ Pushed certificate to {}", report.staging_path),
        Err(e) => eprintln!("⚠️ Push failed: {e}"),
    }
    match &report.install {
        Ok(_) => {
            println!("✅ Installed certificate at {}", report.final_path());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Certificate not installed: {e}");
            eprintln!("   It may still be staged at {}", report.staging_path);
            ExitCode::from(EXIT_NOT_INSTALLED)
        }
    }
}
