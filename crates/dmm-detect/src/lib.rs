//! DMM Serial Port Detection Library
//!
//! This crate provides serial port enumeration, automatic selection of the
//! port a meter is most likely attached to, and opening that port with the
//! meter's line settings.
//!
//! # Example
//!
//! ```rust,no_run
//! use dmm_detect::{open_meter_port, LinkConfig, PortScanner, PortSelector};
//!
//! let ports = PortScanner::new().enumerate_ports().unwrap();
//! let selection = PortSelector::new().select(&ports, None).unwrap();
//!
//! println!("Using {}", selection.port());
//! let link = open_meter_port(selection.port(), &LinkConfig::default()).unwrap();
//! ```

pub mod error;
pub mod link;
pub mod scanner;
pub mod select;
pub mod usb_ids;

pub use error::DetectError;
pub use link::{open_meter_port, LinkConfig, MeterPort};
pub use scanner::{PortKind, PortScanner, SerialPortInfo};
pub use select::{Candidate, PortSelector, Selection, SelectorConfig};
pub use usb_ids::Chipset;
