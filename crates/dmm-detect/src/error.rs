//! Error types for port detection

use thiserror::Error;

use crate::scanner::SerialPortInfo;

/// Errors that can occur while finding or opening the meter's port
#[derive(Debug, Error)]
pub enum DetectError {
    /// Failed to enumerate serial ports
    #[error("failed to enumerate ports: {0}")]
    EnumerationFailed(String),

    /// Manually specified port is not among the enumerated ones
    #[error("port {port} not found, available ports: {}", .available.join(", "))]
    PortNotFound {
        port: String,
        available: Vec<String>,
    },

    /// No enumerated port looks like a serial adapter
    #[error("no USB/serial port detected{}", list_ports(.ports))]
    NoCandidates { ports: Vec<SerialPortInfo> },

    /// Failed to open serial port
    #[error("failed to open port {port}: {reason}")]
    OpenFailed { port: String, reason: String },

    /// Serial port error
    #[error("serial port error: {0}")]
    SerialPort(#[from] serialport::Error),
}

fn list_ports(ports: &[SerialPortInfo]) -> String {
    if ports.is_empty() {
        return ", no ports enumerated".to_string();
    }

    let mut out = String::from(", available ports:");
    for port in ports {
        out.push_str("\n  ");
        out.push_str(&port.summary());
    }
    out
}
