//! xOPS Stress command-line runner
//!
//! Runs one stress session against the local CPU, printing live labels on
//! every results update and the final summary when the session ends.
//!
//! ```text
//! xops_stress [--seconds N] [--settings PATH] [--log-file PATH] [--verbose]
//! ```

use anyhow::{bail, Context};
use crossbeam_channel::{bounded, select, Receiver};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use xops_stress::config::{BenchSettings, JsonFileStore};
use xops_stress::hardware::{DeviceInfo, HwmonSensor};
use xops_stress::stress::{
    CpuWorkload, SessionConfig, SessionController, StatusLabels, ThreadOptionSet,
};
use xops_stress::LogCollector;

const DEFAULT_SECONDS: u64 = 20;
const USAGE: &str = "xops_stress [--seconds N] [--settings PATH] [--log-file PATH] [--verbose]";

struct Args {
    seconds: u64,
    settings: Option<PathBuf>,
    log_file: Option<PathBuf>,
    verbose: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        seconds: DEFAULT_SECONDS,
        settings: None,
        log_file: None,
        verbose: false,
    };

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--seconds" => {
                let value = it.next().context("--seconds needs a value")?;
                args.seconds = value
                    .parse()
                    .with_context(|| format!("invalid --seconds value: {}", value))?;
            }
            "--settings" => {
                args.settings = Some(it.next().context("--settings needs a path")?.into());
            }
            "--log-file" => {
                args.log_file = Some(it.next().context("--log-file needs a path")?.into());
            }
            "--verbose" | "-v" => args.verbose = true,
            "--help" | "-h" => {
                println!("xops_stress {}\n\nUSAGE:\n    {}", xops_stress::VERSION, USAGE);
                std::process::exit(0);
            }
            other => bail!("unknown argument: {}", other),
        }
    }
    Ok(args)
}

fn print_labels(title: &str, labels: &StatusLabels) {
    println!("── {} ──", title);
    for metric in &labels.metrics {
        println!("[{}]\n{}", metric.metric, metric.text);
    }
    if !labels.thermal.is_empty() {
        println!("[Thermal]\n{}", labels.thermal);
    }
    println!();
}

/// Print live labels on every results update until `shutdown` fires
fn consume_updates(
    controller: Arc<Mutex<SessionController>>,
    updates: Receiver<()>,
    shutdown: Receiver<()>,
) {
    loop {
        select! {
            recv(updates) -> msg => {
                if msg.is_err() {
                    break;
                }
                let labels = controller
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .live_labels();
                print_labels("Live", &labels);
            }
            recv(shutdown) -> _ => break,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_args()?;

    // =========================================================================
    // LOGGING INITIALIZATION - MUST BE FIRST
    // =========================================================================
    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let log_collector = match LogCollector::install(args.log_file.clone(), level) {
        Ok(collector) => Some(collector),
        Err(e) => {
            eprintln!("[Main] WARNING: LogCollector initialization failed: {}", e);
            None
        }
    };
    log::info!("[Main] xOPS Stress {} starting", xops_stress::VERSION);

    // =========================================================================
    // HARDWARE + SETTINGS
    // =========================================================================
    let device = DeviceInfo::detect();
    let options = ThreadOptionSet::new(device.logical_processors as usize);

    let store = match args.settings {
        Some(path) => JsonFileStore::open(path),
        None => JsonFileStore::open_default(),
    };
    let settings = BenchSettings::load(&store, options);
    log::info!(
        "[Main] Settings: float {} threads ({}-bit), int {} threads ({}-bit)",
        settings.float_threads,
        if settings.float_64bit { 64 } else { 32 },
        settings.int_threads,
        if settings.int_64bit { 64 } else { 32 },
    );

    let config = SessionConfig {
        workload: settings.to_request(),
        ..SessionConfig::default()
    };

    // =========================================================================
    // SESSION
    // =========================================================================
    let mut controller =
        SessionController::new(config, Arc::new(CpuWorkload), Arc::new(HwmonSensor::discover()));
    let updates = controller.subscribe();

    if let Err(e) = controller.start() {
        bail!(e.user_message());
    }

    let controller = Arc::new(Mutex::new(controller));
    let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
    let consumer = {
        let controller = Arc::clone(&controller);
        tokio::task::spawn_blocking(move || consume_updates(controller, updates, shutdown_rx))
    };

    println!(
        "Stressing {} for {} s (Ctrl+C to stop early)\n",
        device.cpu_model, args.seconds
    );

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(args.seconds)) => {}
        _ = tokio::signal::ctrl_c() => log::info!("[Main] Interrupted, stopping early"),
    }

    let _ = shutdown_tx.send(());
    consumer.await.context("update consumer panicked")?;

    let summary = tokio::task::spawn_blocking({
        let controller = Arc::clone(&controller);
        move || controller.lock().unwrap_or_else(|e| e.into_inner()).stop()
    })
    .await
    .context("session shutdown panicked")?;

    match summary {
        Some(labels) => print_labels("Summary", &labels),
        None => log::warn!("[Main] Session was not running at shutdown"),
    }

    // =========================================================================
    // SHUTDOWN
    // =========================================================================
    if let Err(e) = settings.save(&store) {
        log::warn!("[Main] Failed to save settings to {}: {}", store.path().display(), e);
    }

    if let Some(collector) = log_collector {
        if let Err(e) = collector.wait_for_empty() {
            eprintln!("[Main] WARNING: Failed to wait for log collector to empty: {}", e);
        }
    }

    Ok(())
}
