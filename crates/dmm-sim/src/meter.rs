//! Virtual meter simulation
//!
//! Provides a simulated meter that answers trigger bytes with scripted,
//! protocol-accurate responses.

use std::collections::VecDeque;
use std::io::{self, Read, Write};

use dmm_protocol::{MeterTransport, TERMINATOR, TRIGGER};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// How the meter answers one trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum SimResponse {
    /// A complete frame; the terminator is appended automatically
    Frame(String),
    /// Bytes without a terminator, as if the meter stalled mid-frame
    Partial(String),
    /// No answer at all
    Silent,
}

impl SimResponse {
    /// Complete frame response
    pub fn frame(text: impl Into<String>) -> Self {
        SimResponse::Frame(text.into())
    }

    /// Truncated response
    pub fn partial(text: impl Into<String>) -> Self {
        SimResponse::Partial(text.into())
    }
}

/// Configuration for creating a virtual meter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualMeterConfig {
    /// Display name/identifier
    pub id: String,
    /// Responses played back in order, one per trigger
    pub script: Vec<SimResponse>,
    /// Start over when the script is exhausted; otherwise stay silent
    pub repeat: bool,
}

impl Default for VirtualMeterConfig {
    fn default() -> Self {
        Self {
            id: "Virtual Protek 506".to_string(),
            script: vec![
                SimResponse::frame("DC  -0.003 V"),
                SimResponse::frame("DC   1.234 V"),
                SimResponse::frame("AC  229.8 V"),
                SimResponse::frame("RES  OL MOhm"),
                SimResponse::frame("RES 1.002k Ohm"),
                SimResponse::frame("CAP 10.02 nF"),
                SimResponse::frame("FR  50.00k Hz"),
                SimResponse::frame("TEMP  23 ^C"),
                SimResponse::frame("LOG High"),
            ],
            repeat: true,
        }
    }
}

/// A simulated meter implementing the trigger/response protocol
#[derive(Debug)]
pub struct VirtualMeter {
    /// Unique identifier for this virtual meter
    id: String,
    /// Response script
    script: Vec<SimResponse>,
    /// Index of the next response
    cursor: usize,
    /// Loop the script
    repeat: bool,
    /// Bytes waiting to be read by the host
    pending_output: VecDeque<u8>,
    /// Number of triggers received
    triggers: usize,
}

impl VirtualMeter {
    /// Create a virtual meter with the default script
    pub fn new() -> Self {
        Self::from_config(VirtualMeterConfig::default())
    }

    /// Create a virtual meter playing `script` once
    pub fn with_script(script: Vec<SimResponse>) -> Self {
        Self::from_config(VirtualMeterConfig {
            script,
            repeat: false,
            ..Default::default()
        })
    }

    /// Create a virtual meter from configuration
    pub fn from_config(config: VirtualMeterConfig) -> Self {
        Self {
            id: config.id,
            script: config.script,
            cursor: 0,
            repeat: config.repeat,
            pending_output: VecDeque::new(),
            triggers: 0,
        }
    }

    /// Get the meter's identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Number of trigger bytes received so far
    pub fn triggers(&self) -> usize {
        self.triggers
    }

    /// Whether every scripted response has been played (never true when repeating)
    pub fn is_exhausted(&self) -> bool {
        !self.repeat && self.cursor >= self.script.len()
    }

    /// Bytes queued for the host
    pub fn pending(&self) -> usize {
        self.pending_output.len()
    }

    fn next_response(&mut self) -> Option<SimResponse> {
        if self.script.is_empty() {
            return None;
        }
        if self.cursor >= self.script.len() {
            if !self.repeat {
                return None;
            }
            self.cursor = 0;
        }
        let response = self.script[self.cursor].clone();
        self.cursor += 1;
        Some(response)
    }

    fn on_trigger(&mut self) {
        self.triggers += 1;
        match self.next_response() {
            Some(SimResponse::Frame(text)) => {
                trace!("{}: answering {:?}", self.id, text);
                self.pending_output.extend(text.bytes());
                self.pending_output.push_back(TERMINATOR);
            }
            Some(SimResponse::Partial(text)) => {
                trace!("{}: answering partial {:?}", self.id, text);
                self.pending_output.extend(text.bytes());
            }
            Some(SimResponse::Silent) | None => {
                trace!("{}: no answer", self.id);
            }
        }
    }
}

impl Default for VirtualMeter {
    fn default() -> Self {
        Self::new()
    }
}

impl Read for VirtualMeter {
    /// Returns queued bytes; with nothing queued behaves like a serial
    /// read timeout.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending_output.is_empty() {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "no data from meter"));
        }

        let n = buf.len().min(self.pending_output.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending_output.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for VirtualMeter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            if byte == TRIGGER {
                self.on_trigger();
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl MeterTransport for VirtualMeter {
    fn discard_input(&mut self) -> io::Result<()> {
        self.pending_output.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmm_protocol::{parse_frame, FrameReader, Mode};

    #[test]
    fn test_answers_trigger_with_frame() {
        let mut meter = VirtualMeter::with_script(vec![SimResponse::frame("DC 1.5 V")]);
        meter.write_all(&[TRIGGER]).unwrap();

        assert_eq!(meter.pending(), b"DC 1.5 V\r".len());
        assert_eq!(meter.triggers(), 1);
    }

    #[test]
    fn test_silent_until_triggered() {
        let mut meter = VirtualMeter::new();
        let mut buf = [0u8; 8];
        let err = meter.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }

    #[test]
    fn test_ignores_other_bytes() {
        let mut meter = VirtualMeter::new();
        meter.write_all(b"xyz\r").unwrap();
        assert_eq!(meter.triggers(), 0);
        assert_eq!(meter.pending(), 0);
    }

    #[test]
    fn test_script_with_frame_reader() {
        let mut meter = VirtualMeter::with_script(vec![
            SimResponse::frame("RES 1.002k Ohm"),
            SimResponse::Silent,
            SimResponse::partial("DC 1."),
            SimResponse::frame("TEMP  23 ^C"),
        ]);
        let reader = FrameReader::new();

        let frame = reader.request(&mut meter).unwrap().unwrap();
        let m = parse_frame(frame.as_bytes()).unwrap();
        assert_eq!(m.mode, Mode::Resistance);
        assert_eq!(m.reading, "1.002k");

        assert_eq!(reader.request(&mut meter).unwrap(), None);
        assert_eq!(reader.request(&mut meter).unwrap(), None);

        let frame = reader.request(&mut meter).unwrap().unwrap();
        assert_eq!(parse_frame(frame.as_bytes()).unwrap().units, "°C");

        assert!(meter.is_exhausted());
        assert_eq!(reader.request(&mut meter).unwrap(), None);
    }

    #[test]
    fn test_discard_drops_stale_bytes() {
        let mut meter = VirtualMeter::with_script(vec![
            SimResponse::frame("A 1 V"),
            SimResponse::frame("A 2 V"),
        ]);
        // Two triggers without reading: the first answer is stale
        meter.write_all(&[TRIGGER]).unwrap();
        let frame = FrameReader::new().request(&mut meter).unwrap().unwrap();
        assert_eq!(frame.as_bytes(), b"A 2 V");
    }

    #[test]
    fn test_repeat_loops_script() {
        let mut meter = VirtualMeter::from_config(VirtualMeterConfig {
            script: vec![SimResponse::frame("D 1 V"), SimResponse::frame("D 2 V")],
            ..Default::default()
        });
        let reader = FrameReader::new();

        let frames: Vec<_> = (0..4)
            .map(|_| reader.request(&mut meter).unwrap().unwrap().into_bytes())
            .collect();
        assert_eq!(
            frames,
            vec![
                b"D 1 V".to_vec(),
                b"D 2 V".to_vec(),
                b"D 1 V".to_vec(),
                b"D 2 V".to_vec()
            ]
        );
        assert!(!meter.is_exhausted());
    }

    #[test]
    fn test_default_script_parses() {
        let config = VirtualMeterConfig::default();
        for response in &config.script {
            if let SimResponse::Frame(text) = response {
                assert!(parse_frame(text.as_bytes()).is_some(), "{text}");
            }
        }
    }

    #[test]
    fn test_config_serde() {
        let config = VirtualMeterConfig {
            id: "bench".to_string(),
            script: vec![SimResponse::frame("D 1 V"), SimResponse::Silent],
            repeat: false,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: VirtualMeterConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.script, config.script);
        assert!(json.contains(r#""kind":"silent""#));
    }
}
