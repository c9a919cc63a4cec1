//! Gesture Remote
//!
//! Main entry point. This application:
//! - Receives hand keypoints from a pose estimator feed
//! - Classifies and debounces hand gestures
//! - Taps the mapped keys on the configured target (log, X11, QEMU guest)

use anyhow::Result;
use clap::Parser;
use gesture_remote::{GestureRemote, RemoteConfig, SinkKind};
use log::LevelFilter;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gesture-remote")]
#[command(about = "Control a media player with hand gestures", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Where key taps go
    #[arg(long, value_enum)]
    sink: Option<SinkArg>,

    /// Bind address for the UDP pose feed (e.g. 127.0.0.1:5005)
    #[arg(long, value_name = "ADDR")]
    pose_udp: Option<SocketAddr>,

    /// QEMU HMP monitor socket for the qemu sink
    #[arg(long, value_name = "PATH")]
    qemu_monitor: Option<PathBuf>,

    /// Run pose inference every Nth cycle
    #[arg(long, value_name = "N")]
    decimation: Option<u32>,

    /// Debug logging (per-cycle gesture changes and loop stats)
    #[arg(short, long)]
    verbose: bool,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_default_config: bool,
}

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
enum SinkArg {
    Log,
    Xdotool,
    Qemu,
}

impl From<SinkArg> for SinkKind {
    fn from(arg: SinkArg) -> Self {
        match arg {
            SinkArg::Log => SinkKind::Log,
            SinkArg::Xdotool => SinkKind::Xdotool,
            SinkArg::Qemu => SinkKind::Qemu,
        }
    }
}

fn load_config(cli: &Cli) -> Result<RemoteConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            log::info!("Loading configuration from {}", path.display());
            RemoteConfig::from_toml_file(path)?
        }
        None => RemoteConfig::default(),
    };
    config.apply_env();

    if let Some(sink) = cli.sink {
        config.sink = sink.into();
    }
    if let Some(addr) = cli.pose_udp {
        config.pose_udp_addr = Some(addr);
    }
    if let Some(sock) = &cli.qemu_monitor {
        config.qemu_monitor_sock = Some(sock.clone());
    }
    if let Some(n) = cli.decimation {
        config.decimation_ratio = n;
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", RemoteConfig::default().to_toml_string()?);
        return Ok(());
    }

    // Initialize logging
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let config = load_config(&cli)?;

    log::info!("═══════════════════════════════════════");
    log::info!("  Gesture Remote");
    log::info!("═══════════════════════════════════════");

    let mut remote = match GestureRemote::new(config).await {
        Ok(r) => r,
        Err(e) => {
            log::error!("Failed to initialize Gesture Remote: {e:#}");
            return Err(e);
        }
    };

    log::info!("Press Ctrl+C to exit");

    let (tx, rx) = tokio::sync::watch::channel(false);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal...");
        let _ = tx.send(true);
    })?;

    remote.run(rx).await?;
    remote.shutdown().await?;

    log::info!("Gesture Remote shutdown complete.");
    Ok(())
}
