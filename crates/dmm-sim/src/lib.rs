//! DMM Simulation Library
//!
//! This crate provides a simulated meter for exercising the acquisition
//! pipeline without a physical instrument. The [`VirtualMeter`] speaks the
//! same trigger/response protocol as the real meter and answers each
//! trigger with the next entry of a response script.
//!
//! # Example
//!
//! ```rust
//! use dmm_protocol::FrameReader;
//! use dmm_sim::{SimResponse, VirtualMeter};
//!
//! let mut meter = VirtualMeter::with_script(vec![SimResponse::frame("DC  1.234 V")]);
//! let frame = FrameReader::new().request(&mut meter).unwrap().unwrap();
//! assert_eq!(frame.as_bytes(), b"DC  1.234 V");
//! ```

pub mod meter;

pub use meter::{SimResponse, VirtualMeter, VirtualMeterConfig};
