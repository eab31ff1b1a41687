//! Error types for the meter protocol

use std::io;

use thiserror::Error;

/// Errors that can occur while exchanging frames with the meter
///
/// Timeouts and incomplete frames are not errors; they surface as an
/// empty cycle. Only transport failures end up here.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Could not drop stale input before triggering
    #[error("failed to discard stale input: {0}")]
    Discard(#[source] io::Error),

    /// Writing the trigger byte failed
    #[error("failed to send trigger byte: {0}")]
    Trigger(#[source] io::Error),

    /// Reading the response failed
    #[error("failed to read frame: {0}")]
    Read(#[source] io::Error),
}
