//! DMM Logger
//!
//! Polls a Protek 506 multimeter over its RS-232 interface and appends every
//! reading to a CSV log, with a live view on the console.

mod cli;
mod console;
mod settings;

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use dmm_acquire::{Acquisition, AcquisitionConfig, CsvSink, RunSummary, ShutdownFlag};
use dmm_detect::{open_meter_port, DetectError, LinkConfig, PortScanner, PortSelector};
use dmm_protocol::{FrameConfig, FrameReader, MeterTransport};
use dmm_sim::VirtualMeter;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, RunOptions};
use settings::Settings;

fn main() -> ExitCode {
    // stdout is the live view, so diagnostics go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "dmm_logger=info,dmm_protocol=info,dmm_detect=info,dmm_acquire=info,dmm_sim=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    if cli.version {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let settings = match &cli.settings {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let options = match cli.resolve(&settings) {
        Ok(options) => options,
        Err(msg) => Cli::command().error(ErrorKind::ValueValidation, msg).exit(),
    };

    match run(options) {
        Ok(summary) => {
            info!(
                "Stopped after {} cycle(s): {} record(s), {} empty, {} discarded",
                summary.cycles, summary.records, summary.empty, summary.discarded
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("\nError: {e:#}");
            if let Some(DetectError::NoCandidates { .. }) = e.downcast_ref::<DetectError>() {
                eprintln!("{}", console::NO_PORT_HINT);
            }
            ExitCode::FAILURE
        }
    }
}

fn install_ctrlc_handler() -> Result<ShutdownFlag> {
    let shutdown = ShutdownFlag::new();
    let for_signal = shutdown.clone();
    ctrlc::set_handler(move || {
        if !for_signal.is_requested() {
            println!("\nCtrl+C pressed - closing port and exiting...");
        }
        for_signal.request();
    })
    .context("installing Ctrl+C handler failed")?;
    Ok(shutdown)
}

fn run(options: RunOptions) -> Result<RunSummary> {
    let shutdown = install_ctrlc_handler()?;
    info!("Starting DMM logger v{}", env!("CARGO_PKG_VERSION"));

    if options.simulate {
        let sink = CsvSink::open(&options.output)?;
        let meter = VirtualMeter::new();
        info!("Using {}", meter.id());
        return log_readings(meter, sink, "Virtual meter", &options, shutdown);
    }

    let ports = PortScanner::new().enumerate_ports()?;
    let selection = PortSelector::with_config(options.selector.clone())
        .select(&ports, options.port.as_deref())?;
    console::write_selection(&mut io::stdout().lock(), &selection)?;

    // The log is claimed before the port so a locked file fails without
    // touching the meter
    let sink = CsvSink::open(&options.output)?;

    let link_config = LinkConfig {
        timeout: options.read_timeout,
        ..Default::default()
    };
    let link = open_meter_port(selection.port(), &link_config)?;

    log_readings(link, sink, "Port", &options, shutdown)
}

fn log_readings<T: MeterTransport>(
    link: T,
    sink: CsvSink,
    source: &str,
    options: &RunOptions,
    shutdown: ShutdownFlag,
) -> Result<RunSummary> {
    console::write_banner(&mut io::stdout().lock(), source, &options.output)?;

    let reader = FrameReader::with_config(FrameConfig {
        timeout: options.read_timeout,
        ..Default::default()
    });
    let config = AcquisitionConfig {
        poll_delay: options.poll_delay,
    };

    let summary = Acquisition::with_config(link, sink, shutdown, config)
        .with_reader(reader)
        .run(|record| println!("{}", console::live_line(record)))?;
    Ok(summary)
}
