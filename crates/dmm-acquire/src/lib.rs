//! DMM Acquisition Engine
//!
//! This crate provides the polling loop that turns a meter link into a
//! durable log, plus the log sink itself.
//!
//! # Architecture
//!
//! A single [`Acquisition`] owns both the meter transport and the sink.
//! Each cycle it triggers the meter, reads one frame, parses it, hands the
//! record to an observer (for a live view) and appends it to the sink,
//! then sleeps for the poll delay.
//!
//! Cancellation is cooperative: a [`ShutdownFlag`] (usually set from a
//! Ctrl+C handler) is checked before every trigger, after every read and
//! throughout the inter-cycle delay. When [`Acquisition::run`] returns, for
//! any reason, the transport and the sink are dropped exactly once.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use dmm_acquire::{Acquisition, AcquisitionConfig, CsvSink, ShutdownFlag};
//! use dmm_sim::VirtualMeter;
//!
//! let sink = CsvSink::open("readings.csv").unwrap();
//! let shutdown = ShutdownFlag::new();
//! let config = AcquisitionConfig {
//!     poll_delay: Duration::from_millis(200),
//! };
//!
//! let acquisition = Acquisition::with_config(VirtualMeter::new(), sink, shutdown, config);
//! let summary = acquisition
//!     .run(|record| println!("{} {}", record.time(), record.measurement.raw))
//!     .unwrap();
//! println!("{} record(s) written", summary.records);
//! ```

pub mod acquisition;
pub mod error;
pub mod shutdown;
pub mod sink;

pub use acquisition::{Acquisition, AcquisitionConfig, CycleOutcome, RunSummary};
pub use error::{AcquireError, SinkError};
pub use shutdown::ShutdownFlag;
pub use sink::{CsvSink, RecordSink};
