//! n64z monitor entry point.
//!
//! Drives the measurement engine once per frame from a poll loop, logs a
//! periodic status line and prints a final report on exit.

mod report;
mod signals;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use n64z_common::config::{MonitorConfig, PlatformBackend, ReportFormat};
use n64z_common::hardware::TvStandard;
use n64z_common::metrics::DerivedMetrics;
use n64z_engine::engine::MeasurementEngine;
use n64z_engine::host::HostPlatform;
use n64z_engine::platform::Platform;
use n64z_engine::simulated::SimulatedPlatform;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use crate::report::MonitorReport;
use crate::signals::SignalHandler;

/// Video standard selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TvArg {
    Pal,
    Ntsc,
    Mpal,
}

impl From<TvArg> for TvStandard {
    fn from(arg: TvArg) -> Self {
        match arg {
            TvArg::Pal => TvStandard::Pal,
            TvArg::Ntsc => TvStandard::Ntsc,
            TvArg::Mpal => TvStandard::Mpal,
        }
    }
}

/// Report format selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

/// n64z monitor command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "n64z-monitor",
    about = "Live CPU frequency, memory bandwidth, frame rate and scanline monitor",
    version,
    long_about = None
)]
struct Args {
    /// Path to a monitor configuration file (TOML).
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Use the deterministic simulated platform.
    #[arg(long, short = 's')]
    simulated: bool,

    /// Video standard (overrides config file).
    #[arg(long, value_enum)]
    tv: Option<TvArg>,

    /// Maximum frames to run (0 = until interrupted).
    #[arg(long, default_value = "0")]
    max_frames: u64,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,

    /// Final report format (overrides config file).
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting n64z monitor");

    let mut config = load_config(&args)?;
    apply_overrides(&mut config, &args);
    config.validate().context("Invalid configuration")?;

    info!(
        backend = ?config.platform.backend,
        tv = %config.platform.tv_standard,
        status_interval = %humantime::format_duration(config.report.status_interval),
        "Configuration loaded"
    );

    let signal_handler = SignalHandler::new().context("Failed to set up signal handlers")?;

    let report = run_monitor(&config, &signal_handler, args.max_frames)?;
    let rendered = report
        .render(config.report.format)
        .context("Failed to render final report")?;
    println!("{rendered}");

    Ok(())
}

/// Initialize logging with the specified log level.
fn init_logging(level: &str) {
    let filter = format!("n64z_monitor={level},n64z_engine={level},n64z_common={level}");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&filter)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Load configuration from file or use defaults.
///
/// Resolution priority (first existing file wins):
/// 1. Command-line `--config` argument
/// 2. `N64Z_CONFIG_PATH` environment variable
/// 3. `config/default.toml` (local development)
/// 4. Built-in defaults
fn load_config(args: &Args) -> Result<MonitorConfig> {
    if let Some(config_path) = &args.config {
        info!(?config_path, "Loading config from command-line argument");
        return MonitorConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {config_path:?}"));
    }

    if let Ok(env_path) = std::env::var("N64Z_CONFIG_PATH") {
        let config_path = PathBuf::from(&env_path);
        if config_path.exists() {
            info!(?config_path, "Loading config from N64Z_CONFIG_PATH");
            return MonitorConfig::from_file(&config_path).with_context(|| {
                format!("Failed to load config from N64Z_CONFIG_PATH={env_path:?}")
            });
        }
        warn!(
            path = %env_path,
            "N64Z_CONFIG_PATH set but file does not exist, checking other locations"
        );
    }

    let local_path = PathBuf::from("config/default.toml");
    if local_path.exists() {
        info!(?local_path, "Loading config from local path");
        return MonitorConfig::from_file(&local_path)
            .with_context(|| format!("Failed to load config from {local_path:?}"));
    }

    info!("No config file found, using built-in defaults");
    Ok(MonitorConfig::default())
}

/// Command-line flags take precedence over the file.
fn apply_overrides(config: &mut MonitorConfig, args: &Args) {
    if args.simulated {
        config.platform.backend = PlatformBackend::Simulated;
    }
    if let Some(tv) = args.tv {
        config.platform.tv_standard = tv.into();
    }
    if let Some(format) = args.format {
        config.report.format = format.into();
    }
}

/// Construct the configured backend and run the frame loop on it.
fn run_monitor(
    config: &MonitorConfig,
    signal_handler: &SignalHandler,
    max_frames: u64,
) -> Result<MonitorReport> {
    match config.platform.backend {
        PlatformBackend::Simulated => {
            info!("Using simulated platform");
            let platform = SimulatedPlatform::from_config(&config.platform);
            run_frame_loop(platform, config, signal_handler, max_frames)
        }
        PlatformBackend::Host => {
            info!("Using host clock platform");
            let platform = HostPlatform::from_config(&config.platform)
                .context("Failed to create host platform")?;
            run_frame_loop(platform, config, signal_handler, max_frames)
        }
    }
}

/// Poll loop: wait for vsync, update the engine, log status.
fn run_frame_loop<P: Platform>(
    platform: P,
    config: &MonitorConfig,
    signal_handler: &SignalHandler,
    max_frames: u64,
) -> Result<MonitorReport> {
    let mut engine = MeasurementEngine::new(platform, &config.engine);
    let started = Instant::now();
    let mut last_status = started;

    info!(max_frames, "Entering frame loop");

    while !signal_handler.shutdown_requested() {
        let vsync = engine.platform().wait_for_vsync();
        if engine.update(vsync).is_none() {
            // Unpaced backends return the current vsync without blocking.
            std::thread::yield_now();
            continue;
        }

        if max_frames > 0 && engine.frame().0 >= max_frames {
            info!(frames = engine.frame().0, "Maximum frame count reached");
            break;
        }

        if last_status.elapsed() >= config.report.status_interval {
            log_status(engine.metrics());
            last_status = Instant::now();
        }
    }

    let uptime = started.elapsed();
    let metrics = engine.snapshot();
    info!(
        total_frames = metrics.total_frames,
        signals = signal_handler.state().signal_count(),
        uptime_secs = uptime.as_secs(),
        "Monitor shutdown complete"
    );

    Ok(MonitorReport::new(
        config.platform.backend,
        engine.system_info(),
        metrics,
        uptime,
    ))
}

fn log_status(metrics: &DerivedMetrics) {
    info!(
        frames = metrics.total_frames,
        cpu_mhz = metrics.cpu_freq_mhz,
        cpu_min_mhz = metrics.cpu_freq_min_mhz,
        cpu_max_mhz = metrics.cpu_freq_max_mhz,
        bandwidth_mbps = metrics.bandwidth_mbps,
        fps = metrics.actual_fps,
        scanline = metrics.current_scanline,
        "Periodic status"
    );
}
