//! DMM Protocol Library
//!
//! This crate provides the wire protocol and reading grammar for digital
//! multimeters with an ASCII RS-232 output (Protek 506 and compatibles):
//!
//! - **Framing**: half-duplex request/response. The host writes a single
//!   trigger byte (`\n`) and the meter answers with one line of text
//!   terminated by `\r`.
//! - **Mode codes**: the first character of every frame selects the
//!   measurement category (`D` = DC, `R` = resistance, ...).
//! - **Readings**: the rest of the frame holds a reading token (a number
//!   with an optional magnitude suffix, or a marker such as `OL`) followed
//!   by the units.
//!
//! # Example
//!
//! ```rust
//! use dmm_protocol::{parse_frame, Mode};
//!
//! let measurement = parse_frame(b"DC  -1.234k Ohm").unwrap();
//! assert_eq!(measurement.mode, Mode::Dc);
//! assert_eq!(measurement.reading, "-1.234k");
//! assert_eq!(measurement.units, "Ohm");
//! ```

pub mod error;
pub mod frame;
pub mod mode;
pub mod parser;
pub mod record;
pub mod scanner;

pub use error::ProtocolError;
pub use frame::{Frame, FrameConfig, FrameReader, MeterTransport, TERMINATOR, TRIGGER};
pub use mode::Mode;
pub use parser::{decode_frame, parse_frame};
pub use record::{Measurement, Record, CSV_HEADER};
pub use scanner::{find_reading, TokenMatch};
