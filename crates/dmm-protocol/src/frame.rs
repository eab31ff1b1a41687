//! Trigger/response framing
//!
//! The meter is silent until asked. Each exchange is:
//!
//! 1. host writes [`TRIGGER`]
//! 2. meter answers with one line of ASCII text ending in [`TERMINATOR`]
//!
//! A response that does not end in the terminator within the timeout is
//! dropped. Nothing is carried over to the next exchange.

use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::error::ProtocolError;

/// Byte that asks the meter for one reading
pub const TRIGGER: u8 = b'\n';

/// Byte that ends every response
pub const TERMINATOR: u8 = b'\r';

/// Maximum frame length accepted before giving up on a response
const MAX_FRAME_LEN: usize = 64;

/// Byte channel to a meter
///
/// Implemented by the serial link and by the simulated meter.
pub trait MeterTransport: Read + Write {
    /// Drop bytes that were received but not read yet
    fn discard_input(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<T: MeterTransport + ?Sized> MeterTransport for Box<T> {
    fn discard_input(&mut self) -> io::Result<()> {
        (**self).discard_input()
    }
}

impl<T: MeterTransport + ?Sized> MeterTransport for &mut T {
    fn discard_input(&mut self) -> io::Result<()> {
        (**self).discard_input()
    }
}

/// One raw response, terminator stripped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame(Vec<u8>);

impl Frame {
    /// Raw frame bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the raw bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// Framing parameters
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Byte written to request a frame
    pub trigger: u8,
    /// Byte that ends a frame
    pub terminator: u8,
    /// Longest accepted frame, terminator excluded
    pub max_len: usize,
    /// How long to wait for the terminator after triggering
    pub timeout: Duration,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            trigger: TRIGGER,
            terminator: TERMINATOR,
            max_len: MAX_FRAME_LEN,
            timeout: Duration::from_secs(1),
        }
    }
}

/// Drives one request/response exchange per call
#[derive(Debug, Clone, Default)]
pub struct FrameReader {
    config: FrameConfig,
}

impl FrameReader {
    /// Create a reader with default framing
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reader with custom framing
    pub fn with_config(config: FrameConfig) -> Self {
        Self { config }
    }

    /// Discard stale input and write the trigger byte
    pub fn trigger<T>(&self, link: &mut T) -> Result<(), ProtocolError>
    where
        T: MeterTransport + ?Sized,
    {
        link.discard_input().map_err(ProtocolError::Discard)?;
        let trigger = [self.config.trigger];
        link.write_all(&trigger).map_err(ProtocolError::Trigger)?;
        link.flush().map_err(ProtocolError::Trigger)?;
        trace!("Sent trigger byte 0x{:02X}", self.config.trigger);
        Ok(())
    }

    /// Read until the terminator, returning `None` for an empty cycle
    ///
    /// Timeouts, a closed stream and over-long responses all yield `None`.
    pub fn read_frame<T>(&self, link: &mut T) -> Result<Option<Frame>, ProtocolError>
    where
        T: MeterTransport + ?Sized,
    {
        let deadline = Instant::now() + self.config.timeout;
        let mut buf = Vec::with_capacity(self.config.max_len);
        let mut byte = [0u8; 1];

        loop {
            if Instant::now() >= deadline {
                debug!("Frame timeout after {} byte(s)", buf.len());
                return Ok(None);
            }

            match link.read(&mut byte) {
                Ok(0) => {
                    debug!("Stream closed after {} byte(s)", buf.len());
                    return Ok(None);
                }
                Ok(_) if byte[0] == self.config.terminator => {
                    trace!("Frame: {:?}", String::from_utf8_lossy(&buf));
                    return Ok(Some(Frame(buf)));
                }
                Ok(_) => {
                    if buf.len() >= self.config.max_len {
                        debug!("Dropping frame longer than {} bytes", self.config.max_len);
                        return Ok(None);
                    }
                    buf.push(byte[0]);
                }
                Err(e) if is_timeout(&e) => {
                    debug!("Frame timeout after {} byte(s)", buf.len());
                    return Ok(None);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ProtocolError::Read(e)),
            }
        }
    }

    /// Trigger and read one frame
    pub fn request<T>(&self, link: &mut T) -> Result<Option<Frame>, ProtocolError>
    where
        T: MeterTransport + ?Sized,
    {
        self.trigger(link)?;
        self.read_frame(link)
    }
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Scripted transport: returns queued bytes, then times out
    #[derive(Default)]
    struct Scripted {
        rx: VecDeque<u8>,
        tx: Vec<u8>,
        discards: usize,
        close_when_empty: bool,
    }

    impl Scripted {
        fn with(bytes: &[u8]) -> Self {
            Self {
                rx: bytes.iter().copied().collect(),
                ..Default::default()
            }
        }
    }

    impl Read for Scripted {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.rx.pop_front() {
                Some(b) => {
                    buf[0] = b;
                    Ok(1)
                }
                None if self.close_when_empty => Ok(0),
                None => Err(io::Error::new(io::ErrorKind::TimedOut, "timeout")),
            }
        }
    }

    impl Write for Scripted {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.tx.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl MeterTransport for Scripted {
        fn discard_input(&mut self) -> io::Result<()> {
            self.discards += 1;
            Ok(())
        }
    }

    #[test]
    fn test_request_complete_frame() {
        let mut link = Scripted::with(b"DC 1.234 V\r");
        let frame = FrameReader::new().request(&mut link).unwrap().unwrap();

        assert_eq!(frame.as_bytes(), b"DC 1.234 V");
        assert_eq!(link.tx, vec![TRIGGER]);
        assert_eq!(link.discards, 1);
    }

    #[test]
    fn test_would_block_counts_as_timeout() {
        assert!(is_timeout(&io::Error::from(io::ErrorKind::WouldBlock)));
        assert!(is_timeout(&io::Error::from(io::ErrorKind::TimedOut)));
        assert!(!is_timeout(&io::Error::from(io::ErrorKind::BrokenPipe)));
    }

    #[test]
    fn test_timeout_is_no_data() {
        let mut link = Scripted::with(b"DC 1.2");
        assert_eq!(FrameReader::new().request(&mut link).unwrap(), None);
    }

    #[test]
    fn test_closed_stream_is_no_data() {
        let mut link = Scripted::with(b"DC 1.2");
        link.close_when_empty = true;
        assert_eq!(FrameReader::new().request(&mut link).unwrap(), None);
    }

    #[test]
    fn test_empty_frame() {
        let mut link = Scripted::with(b"\r");
        let frame = FrameReader::new().request(&mut link).unwrap().unwrap();
        assert!(frame.as_bytes().is_empty());
    }

    #[test]
    fn test_overlong_frame_dropped() {
        let mut bytes = vec![b'D'; MAX_FRAME_LEN + 1];
        bytes.push(TERMINATOR);
        let mut link = Scripted::with(&bytes);
        assert_eq!(FrameReader::new().request(&mut link).unwrap(), None);
    }

    #[test]
    fn test_read_stops_at_terminator() {
        let mut link = Scripted::with(b"A 1 V\rR 2 Ohm\r");
        let reader = FrameReader::new();

        let first = reader.request(&mut link).unwrap().unwrap();
        assert_eq!(first.as_bytes(), b"A 1 V");
        // Second frame stays in the transport until the next exchange
        assert_eq!(link.rx.len(), b"R 2 Ohm\r".len());
    }

    #[test]
    fn test_read_error_propagates() {
        struct Broken;

        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"))
            }
        }

        impl Write for Broken {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        impl MeterTransport for Broken {}

        let err = FrameReader::new().request(&mut Broken).unwrap_err();
        assert!(matches!(err, ProtocolError::Read(_)));
    }

    #[test]
    fn test_custom_framing() {
        let config = FrameConfig {
            trigger: b'?',
            terminator: b';',
            ..Default::default()
        };
        let mut link = Scripted::with(b"D 5 V;");
        let frame = FrameReader::with_config(config)
            .request(&mut link)
            .unwrap()
            .unwrap();

        assert_eq!(frame.into_bytes(), b"D 5 V".to_vec());
        assert_eq!(link.tx, vec![b'?']);
    }
}
