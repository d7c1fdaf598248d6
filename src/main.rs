//! kilnctl: Main Entry Point
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  rpi::acquire / SimKiln   LogEventSink   JsonConfigFile      │
//! │  (Sensor + Heater)        (EventSink)    (ConfigPort)        │
//! │  axum router (status / command surface)                      │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ─────────────────       │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │  KilnService behind KilnHandle (one lock)          │      │
//! │  │  Session FSM · Filter · PID · Hysteresis           │      │
//! │  └────────────────────────────────────────────────────┘      │
//! │                                                              │
//! │  ControlLoop thread (owns the sensor, fixed cadence)         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use kilnctl::adapters::config_file::JsonConfigFile;
use kilnctl::adapters::log_sink::LogEventSink;
use kilnctl::adapters::sim::SimKiln;
use kilnctl::app::control_loop::ControlLoop;
use kilnctl::app::ports::{ConfigPort, HeaterPort, SensorPort};
use kilnctl::app::service::{KilnHandle, KilnService};
use kilnctl::config::KilnConfig;
use kilnctl::http::create_router;
use kilnctl::sensors::ThermocoupleReader;

#[derive(Parser, Debug)]
#[command(
    name = "kilnctl",
    version,
    about = "Closed-loop electric kiln controller",
    long_about = "Reads a MAX31855 thermocouple once per control period, runs PID + \
                  hysteresis, and switches the heater relay.  Firings are started, \
                  stopped and monitored over HTTP."
)]
struct Args {
    /// JSON configuration file (missing file = defaults)
    #[arg(short, long, default_value = "kiln.json")]
    config: PathBuf,

    /// HTTP listen address, overrides `bind_addr` from the config
    #[arg(short, long)]
    bind: Option<String>,

    /// Run against the simulated kiln instead of GPIO
    #[arg(short, long)]
    simulate: bool,

    /// Log filter (e.g. `debug`, `kilnctl=trace`); defaults to RUST_LOG, then `info`
    #[arg(long)]
    log_level: Option<String>,

    /// Save the effective configuration to `--config` and exit
    #[arg(long)]
    write_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    info!("kilnctl v{} starting", env!("CARGO_PKG_VERSION"));

    // ── 1. Configuration ──────────────────────────────────────
    let store = JsonConfigFile::new(&args.config);
    let mut config = store
        .load()
        .with_context(|| format!("loading config from {}", args.config.display()))?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    config.validate().context("invalid configuration")?;

    if args.write_config {
        store
            .save(&config)
            .with_context(|| format!("writing config to {}", args.config.display()))?;
        return Ok(());
    }
    let offset = config.thermocouple_offset_c;

    // ── 2. Hardware ───────────────────────────────────────────
    #[cfg(feature = "rpi")]
    if !args.simulate {
        let (sensor, relay) = kilnctl::adapters::rpi::acquire(&config.pins)
            .context("acquiring GPIO")?;
        return run(config, sensor.with_offset(offset), relay).await;
    }
    #[cfg(not(feature = "rpi"))]
    if !args.simulate {
        warn!("Built without `rpi` support, falling back to the simulated kiln");
    }

    info!("Using simulated kiln");
    let kiln = SimKiln::default();
    let (thermocouple, heater) = kiln.split();
    let sensor = ThermocoupleReader::new(thermocouple).with_offset(offset);
    run(config, sensor, heater).await
}

/// Wire the service, start the loop thread, and serve HTTP until a
/// shutdown signal arrives.  The heater is released on every exit path.
async fn run<S, H>(config: KilnConfig, sensor: S, heater: H) -> Result<()>
where
    S: SensorPort + Send + 'static,
    H: HeaterPort + Send + 'static,
{
    // ── 3. Service + control loop ─────────────────────────────
    let service = KilnService::new(&config, heater, LogEventSink::new(), Instant::now());
    let handle = KilnHandle::new(service);
    let interval = Duration::from_millis(u64::from(config.control_loop_interval_ms));
    let control = ControlLoop::new(sensor, handle.clone(), interval).spawn()?;

    // ── 4. HTTP surface ───────────────────────────────────────
    let served = serve(&config.bind_addr, handle.clone()).await;

    // ── 5. Shutdown ───────────────────────────────────────────
    if control.stop().is_none() {
        warn!("Control loop ended abnormally");
    }
    handle.shutdown();
    served
}

async fn serve<H>(bind_addr: &str, handle: KilnHandle<H, LogEventSink>) -> Result<()>
where
    H: HeaterPort + Send + 'static,
{
    let addr: SocketAddr = bind_addr
        .parse()
        .with_context(|| format!("invalid bind address {bind_addr}"))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Kiln controller listening on http://{addr}");

    axum::serve(listener, create_router(handle))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server")
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
