//! Port enumeration
//!
//! Wraps `serialport::available_ports` into a list of [`SerialPortInfo`]
//! ordered by port name, which is what selection works from.

use serialport::{available_ports, SerialPortType};
use tracing::debug;

use crate::error::DetectError;
use crate::usb_ids::adapter_name;

/// One enumerated port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialPortInfo {
    /// Device identifier, e.g. `/dev/ttyUSB0` or `COM3`
    pub port: String,
    /// Bus the port sits on
    pub kind: PortKind,
    /// Vendor ID, USB adapters only
    pub vid: Option<u16>,
    /// Product ID, USB adapters only
    pub pid: Option<u16>,
    /// Adapter serial number when the OS reports one
    pub serial_number: Option<String>,
    /// Manufacturer string, may be absent
    pub manufacturer: Option<String>,
    /// Product string, used as the description
    pub product: Option<String>,
}

/// Bus type reported by the OS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    Usb,
    Pci,
    Bluetooth,
    Unknown,
}

impl SerialPortInfo {
    fn from_port_type(name: String, port_type: &SerialPortType) -> Self {
        match port_type {
            SerialPortType::UsbPort(usb) => Self {
                kind: PortKind::Usb,
                vid: Some(usb.vid),
                pid: Some(usb.pid),
                serial_number: usb.serial_number.as_ref().map(|s| s.trim().to_string()),
                manufacturer: usb.manufacturer.as_ref().map(|s| s.trim().to_string()),
                product: usb.product.as_ref().map(|s| s.trim().to_string()),
                ..Self::plain(name)
            },
            other => Self {
                kind: match other {
                    SerialPortType::PciPort => PortKind::Pci,
                    SerialPortType::BluetoothPort => PortKind::Bluetooth,
                    _ => PortKind::Unknown,
                },
                ..Self::plain(name)
            },
        }
    }

    /// A port with nothing known about it but its name
    pub fn plain(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            kind: PortKind::Unknown,
            vid: None,
            pid: None,
            serial_number: None,
            manufacturer: None,
            product: None,
        }
    }

    /// Human-readable description: USB product string, else the bus type
    pub fn description(&self) -> &str {
        if let Some(product) = self.product.as_deref() {
            return product;
        }
        match self.kind {
            PortKind::Usb => "USB serial device",
            PortKind::Pci => "PCI serial port",
            PortKind::Bluetooth => "Bluetooth serial port",
            PortKind::Unknown => "n/a",
        }
    }

    /// Adapter family named by the vendor ID, when it is a known one
    pub fn adapter(&self) -> Option<&'static str> {
        self.vid.and_then(adapter_name)
    }

    /// `name - description (manufacturer)` line for diagnostics
    pub fn summary(&self) -> String {
        format!(
            "{} - {} ({})",
            self.port,
            self.description(),
            self.manufacturer.as_deref().unwrap_or("Unknown")
        )
    }
}

/// Lists the ports visible to the OS
#[derive(Debug, Default)]
pub struct PortScanner;

impl PortScanner {
    pub fn new() -> Self {
        Self
    }

    /// Every visible port, ordered by device identifier
    pub fn enumerate_ports(&self) -> Result<Vec<SerialPortInfo>, DetectError> {
        let mut ports: Vec<SerialPortInfo> = available_ports()
            .map_err(|e| DetectError::EnumerationFailed(e.to_string()))?
            .into_iter()
            .map(|p| SerialPortInfo::from_port_type(p.port_name, &p.port_type))
            .collect();
        ports.sort_by(|a, b| a.port.cmp(&b.port));

        debug!("{} serial port(s) visible", ports.len());
        for port in &ports {
            debug!("  {}", port.summary());
        }

        Ok(ports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serialport::UsbPortInfo;

    #[test]
    fn test_usb_port_keeps_adapter_details() {
        let usb = SerialPortType::UsbPort(UsbPortInfo {
            vid: 0x0403,
            pid: 0x6001,
            serial_number: Some("A50285BI".to_string()),
            manufacturer: Some("FTDI ".to_string()),
            product: Some("FT232R USB UART".to_string()),
        });

        let info = SerialPortInfo::from_port_type("/dev/ttyUSB0".to_string(), &usb);

        assert_eq!(info.kind, PortKind::Usb);
        assert_eq!((info.vid, info.pid), (Some(0x0403), Some(0x6001)));
        assert_eq!(info.manufacturer.as_deref(), Some("FTDI"));
        assert_eq!(info.description(), "FT232R USB UART");
        assert_eq!(info.summary(), "/dev/ttyUSB0 - FT232R USB UART (FTDI)");
        assert_eq!(info.adapter(), Some("FTDI"));
    }

    #[test]
    fn test_unknown_vendor_has_no_adapter() {
        let info = SerialPortInfo {
            kind: PortKind::Usb,
            vid: Some(0x2341),
            ..SerialPortInfo::plain("/dev/ttyACM0")
        };
        assert_eq!(info.adapter(), None);
        assert_eq!(SerialPortInfo::plain("COM1").adapter(), None);
    }

    #[test]
    fn test_pci_port_has_bus_description() {
        let info = SerialPortInfo::from_port_type("COM1".to_string(), &SerialPortType::PciPort);

        assert_eq!(info.kind, PortKind::Pci);
        assert_eq!(info.vid, None);
        assert_eq!(info.description(), "PCI serial port");
        assert_eq!(info.summary(), "COM1 - PCI serial port (Unknown)");
    }

    #[test]
    fn test_plain_port() {
        let info = SerialPortInfo::plain("/dev/ttyS0");
        assert_eq!(info.description(), "n/a");
        assert!(info.manufacturer.is_none());
    }
}
