//! Console output
//!
//! stdout carries the operator-facing view; diagnostics go through tracing
//! on stderr.

use std::io::{self, Write};
use std::path::Path;

use dmm_detect::Selection;
use dmm_protocol::Record;

/// Hint printed after a failed auto-selection
pub const NO_PORT_HINT: &str =
    "Plug in the adapter (or use -p/--port to specify manually) and rerun.";

/// Describe which port was chosen and why
pub fn write_selection(out: &mut impl Write, selection: &Selection) -> io::Result<()> {
    if selection.manual {
        return writeln!(out, "Using manually specified port: {}", selection.port());
    }

    let info = &selection.chosen.info;
    writeln!(out, "Auto-selected port: {}", info.port)?;
    writeln!(out, "  Description: {}", info.description())?;
    writeln!(
        out,
        "  Manufacturer: {}",
        info.manufacturer.as_deref().unwrap_or("Unknown")
    )?;
    if let Some(adapter) = info.adapter() {
        writeln!(out, "  Adapter: {adapter}")?;
    }

    if !selection.runners_up.is_empty() {
        writeln!(out)?;
        writeln!(out, "Other candidate ports (ignored):")?;
        for candidate in &selection.runners_up {
            writeln!(out, "  {}", candidate.info.summary())?;
        }
    }
    Ok(())
}

/// Startup banner shown once the link and the log are open
pub fn write_banner(out: &mut impl Write, source: &str, output: &Path) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{source} open. Ensure RS-232 mode is enabled on the meter.")?;
    writeln!(out, "Logging to: {}", output.display())?;
    writeln!(out, "Started - press Ctrl+C to stop.")?;
    writeln!(out)
}

/// One live-view line: capture time and the frame as received
pub fn live_line(record: &Record) -> String {
    format!("{} {}", record.time(), record.measurement.raw)
}
