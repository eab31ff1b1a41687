//! Serial link to the meter
//!
//! Opens the chosen port with the meter's fixed line settings and wraps it
//! as a [`MeterTransport`].

use std::io::{self, Read, Write};
use std::time::Duration;

use dmm_protocol::MeterTransport;
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info};

use crate::error::DetectError;

/// Line settings for the meter's RS-232 port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
    /// Per-read timeout; bounds how long one exchange can block
    pub timeout: Duration,
}

impl Default for LinkConfig {
    /// 1200 baud, 7N2, 1 s timeout
    fn default() -> Self {
        Self {
            baud_rate: 1200,
            data_bits: DataBits::Seven,
            stop_bits: StopBits::Two,
            parity: Parity::None,
            timeout: Duration::from_secs(1),
        }
    }
}

/// An open, exclusively held serial port
///
/// The port is closed when this value is dropped.
pub struct MeterPort {
    name: String,
    port: Box<dyn SerialPort>,
}

impl std::fmt::Debug for MeterPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeterPort").field("name", &self.name).finish()
    }
}

impl Read for MeterPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for MeterPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

impl MeterTransport for MeterPort {
    fn discard_input(&mut self) -> io::Result<()> {
        self.port.clear(ClearBuffer::Input).map_err(io::Error::from)
    }
}

impl Drop for MeterPort {
    fn drop(&mut self) {
        info!("Closing serial port {}", self.name);
    }
}

/// Open `port_name` for exclusive use with the meter's line settings
pub fn open_meter_port(port_name: &str, config: &LinkConfig) -> Result<MeterPort, DetectError> {
    debug!(
        "Opening {} at {} baud ({:?}, {:?}, {:?})",
        port_name, config.baud_rate, config.data_bits, config.parity, config.stop_bits
    );

    let builder = serialport::new(port_name, config.baud_rate)
        .data_bits(config.data_bits)
        .stop_bits(config.stop_bits)
        .parity(config.parity)
        .flow_control(FlowControl::None)
        .timeout(config.timeout);

    let open_failed = |e: serialport::Error| DetectError::OpenFailed {
        port: port_name.to_string(),
        reason: e.to_string(),
    };

    #[cfg(unix)]
    let port: Box<dyn SerialPort> = {
        let mut port = builder.open_native().map_err(open_failed)?;
        port.set_exclusive(true).map_err(open_failed)?;
        Box::new(port)
    };

    // COM ports are exclusive on Windows already
    #[cfg(not(unix))]
    let port: Box<dyn SerialPort> = builder.open().map_err(open_failed)?;

    info!("Opened serial port {}", port_name);
    Ok(MeterPort {
        name: port_name.to_string(),
        port,
    })
}
