//! Error types for the acquisition engine

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from the log sink
#[derive(Debug, Error)]
pub enum SinkError {
    /// Could not open or create the log file
    #[error("cannot write to {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Another process holds the log file
    #[error("{} is in use by another logger: {source}", .path.display())]
    Locked {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing a row failed
    #[error("failed to write row: {0}")]
    Write(#[from] csv::Error),

    /// Flushing to disk failed
    #[error("failed to sync log file: {0}")]
    Sync(#[source] io::Error),
}

/// Errors that end an acquisition run
#[derive(Debug, Error)]
pub enum AcquireError {
    /// Meter link failure
    #[error("meter link error: {0}")]
    Protocol(#[from] dmm_protocol::ProtocolError),

    /// Log sink failure
    #[error("log error: {0}")]
    Sink(#[from] SinkError),
}
