//! Command-line options

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use dmm_detect::SelectorConfig;

use crate::settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "dmm-logger")]
#[command(about = "Protek 506 serial logger")]
pub struct Cli {
    /// Manual serial port override (e.g. COM3, /dev/ttyUSB0)
    #[arg(short, long)]
    pub port: Option<String>,

    /// Output CSV file [default: Protek-506-log.txt]
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Polling delay in seconds [default: 0.2]
    #[arg(short, long, value_name = "SECONDS", value_parser = parse_delay)]
    pub delay: Option<Duration>,

    /// Print the version number and exit
    #[arg(short = 'v', long)]
    pub version: bool,

    /// Settings file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Log from a simulated meter instead of a serial port
    #[arg(long)]
    pub simulate: bool,
}

/// Everything a run needs, after merging settings and options
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub port: Option<String>,
    pub output: PathBuf,
    pub poll_delay: Duration,
    pub read_timeout: Duration,
    pub selector: SelectorConfig,
    pub simulate: bool,
}

impl Cli {
    /// Merge with `settings` (options win) and validate the result
    pub fn resolve(self, settings: &Settings) -> Result<RunOptions, String> {
        let poll_delay = match self.delay {
            Some(delay) => delay,
            None => delay_from_secs(settings.poll_delay_secs)
                .map_err(|e| format!("poll_delay_secs in settings: {e}"))?,
        };
        let output = self.file.unwrap_or_else(|| settings.output_file.clone());
        check_output_dir(&output)?;

        Ok(RunOptions {
            port: self.port,
            output,
            poll_delay,
            read_timeout: Duration::from_millis(settings.read_timeout_ms.max(1)),
            selector: SelectorConfig {
                preferred_chipsets: settings.preferred_chipsets.clone(),
                ..Default::default()
            },
            simulate: self.simulate,
        })
    }
}

fn parse_delay(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    delay_from_secs(secs)
}

/// Positive seconds that fit in a `Duration`
fn delay_from_secs(secs: f64) -> Result<Duration, String> {
    match Duration::try_from_secs_f64(secs) {
        Ok(delay) if !delay.is_zero() => Ok(delay),
        _ => Err("delay must be a positive number greater than 0".to_string()),
    }
}

/// The log's directory must already exist
fn check_output_dir(path: &Path) -> Result<(), String> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if dir.is_dir() {
        Ok(())
    } else {
        Err(format!(
            "directory for --file '{}' does not exist: {}",
            path.display(),
            dir.display()
        ))
    }
}
