//! Gesture Capture CLI
//!
//! Records accelerometer gestures from a serial capture board.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use gesture_capture::{
    capture::{CommandRelay, RecordWriter},
    config::Config,
    runner::{wait_while_running, CaptureRunner},
    stats::{create_shared_stats_with_persistence, CaptureStats},
    stream::{find_capture_port, list_ports, ports::format_port_list, KeySource, SerialTransport},
    CONTROLS_HELP, VERSION,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Granularity of the post-connect wait, so Ctrl+C is honoured promptly.
const SETTLE_STEP: Duration = Duration::from_millis(50);

#[derive(Parser)]
#[command(name = "gesture-capture")]
#[command(version = VERSION)]
#[command(about = "Capture accelerometer gestures from a serial board to CSV", long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture gestures until interrupted
    Capture {
        /// Serial port to use (default: auto-detect)
        #[arg(long)]
        port: Option<String>,

        /// Baud rate
        #[arg(long)]
        baud: Option<u32>,

        /// Gesture label
        #[arg(long)]
        gesture: Option<String>,

        /// Subject label
        #[arg(long)]
        person: Option<String>,

        /// Output directory; records go to <output>/<gesture>/
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Do not read operator keys from stdin
        #[arg(long)]
        no_keys: bool,
    },

    /// List available serial ports
    Ports,

    /// Show cumulative capture statistics
    Status,

    /// Show configuration
    Config {
        /// Write the default configuration file if none exists
        #[arg(long)]
        init: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Capture {
            port,
            baud,
            gesture,
            person,
            output,
            no_keys,
        } => cmd_capture(port, baud, gesture, person, output, no_keys),
        Commands::Ports => cmd_ports(),
        Commands::Status => cmd_status(),
        Commands::Config { init } => cmd_config(init),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn cmd_capture(
    port: Option<String>,
    baud: Option<u32>,
    gesture: Option<String>,
    person: Option<String>,
    output: Option<PathBuf>,
    no_keys: bool,
) -> anyhow::Result<()> {
    println!("Gesture Capture v{VERSION}");
    println!();

    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("Could not load config, using defaults: {}", e);
        Config::default()
    });
    if let Some(port) = port {
        config.port = Some(port);
    }
    if let Some(baud) = baud {
        config.baud_rate = baud;
    }
    if let Some(gesture) = gesture {
        config.gesture = gesture;
    }
    if let Some(person) = person {
        config.person = person;
    }
    if let Some(output) = output {
        config.output_dir = output;
    }

    let port = match config.port.clone() {
        Some(port) => port,
        None => match find_capture_port().context("Could not enumerate serial ports")? {
            Some(port) => port,
            None => {
                eprintln!("{}", format_port_list(&list_ports().unwrap_or_default()));
                bail!(gesture_capture::Error::NoDeviceFound);
            }
        },
    };

    config
        .ensure_directories()
        .context("Could not create output directories")?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Error setting Ctrl+C handler")?;

    let stats = create_shared_stats_with_persistence(config.stats_path());

    println!("Connecting to {} at {} baud...", port, config.baud_rate);
    let transport = SerialTransport::open(&port, config.baud_rate, config.read_timeout)
        .with_context(|| format!("Could not open {port}"))?;

    let result = if wait_while_running(config.settle_delay, SETTLE_STEP, &running) {
        println!("Connected! Waiting for gesture data...");
        println!("  Gesture: {}", config.gesture);
        println!("  Person: {}", config.person);
        println!("  Records: {}", config.record_dir().display());
        println!("{CONTROLS_HELP}");

        let writer = RecordWriter::new(
            config.record_dir(),
            config.gesture.clone(),
            config.person.clone(),
        );

        let mut runner =
            CaptureRunner::new(transport, writer, stats.clone(), config.poll_interval);
        if !no_keys {
            runner = runner.with_relay(CommandRelay::new(KeySource::stdin()));
        }
        runner.run(&running)
    } else {
        // Interrupted while the board was resetting
        drop(transport);
        Ok(())
    };

    println!();
    println!("Exiting...");
    if let Err(e) = stats.save() {
        tracing::warn!("Could not save capture stats: {}", e);
    }
    println!("{}", stats.summary());

    result.context("Capture stopped")
}

fn cmd_ports() -> anyhow::Result<()> {
    let ports = list_ports().context("Could not enumerate serial ports")?;
    println!("{}", format_port_list(&ports));
    Ok(())
}

fn cmd_status() -> anyhow::Result<()> {
    let config = Config::load().unwrap_or_default();

    println!("Gesture Capture Status");
    println!("======================");
    println!();
    println!("Configuration:");
    println!(
        "  Port: {}",
        config.port.as_deref().unwrap_or("auto-detect")
    );
    println!("  Gesture: {}", config.gesture);
    println!("  Person: {}", config.person);
    println!("  Records: {}", config.record_dir().display());
    println!();

    match CaptureStats::load(&config.stats_path()) {
        Ok(Some(totals)) => {
            println!("Cumulative Statistics:");
            println!("  Runs: {}", totals.runs);
            println!(
                "  Records written: {} ({} samples)",
                totals.records_written, totals.samples_written
            );
            println!("  Empty captures: {}", totals.empty_episodes);
            println!("  Write failures: {}", totals.write_failures);
            println!("  Undecodable lines: {}", totals.decode_failures);
            println!("  Malformed samples: {}", totals.parse_failures);
        }
        Ok(None) => println!("No previous capture data found."),
        Err(e) => tracing::warn!("Could not read capture stats: {}", e),
    }

    Ok(())
}

fn cmd_config(init: bool) -> anyhow::Result<()> {
    let config = Config::load().context("Could not load configuration")?;
    let path = Config::config_path();

    if init && !path.exists() {
        config.save().context("Could not save configuration")?;
        println!("Wrote default configuration to {}", path.display());
    }

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {}", path.display());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
