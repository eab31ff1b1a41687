//! Acquisition loop
//!
//! Drives one trigger/response exchange per cycle, turns accepted frames into
//! records and hands them to the sink.

use std::time::Duration;

use dmm_protocol::{parse_frame, FrameReader, MeterTransport, Record};
use tracing::{debug, error, info};

use crate::error::AcquireError;
use crate::shutdown::ShutdownFlag;
use crate::sink::RecordSink;

/// Loop configuration
#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    /// Pause between cycles
    pub poll_delay: Duration,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            poll_delay: Duration::from_millis(200),
        }
    }
}

/// Result of a single cycle
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// A stop was requested; nothing was persisted this cycle
    Cancelled,
    /// The meter did not answer with a complete frame
    NoData,
    /// A frame arrived but did not start with a known mode code
    Discarded,
    /// A record was shown and persisted
    Recorded(Record),
}

/// Counters reported when a run ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Triggers sent
    pub cycles: u64,
    /// Records persisted
    pub records: u64,
    /// Cycles without a complete frame
    pub empty: u64,
    /// Frames rejected by the mode gate
    pub discarded: u64,
}

/// Points at which a stop request is honoured
#[derive(Debug, Clone, Copy)]
enum Checkpoint {
    BeforeTrigger,
    AfterRead,
    AfterParse,
}

impl Checkpoint {
    fn as_str(self) -> &'static str {
        match self {
            Checkpoint::BeforeTrigger => "before trigger",
            Checkpoint::AfterRead => "after read",
            Checkpoint::AfterParse => "after parse",
        }
    }
}

/// Owns the meter link and the sink for the duration of a run
pub struct Acquisition<T, S> {
    link: T,
    sink: S,
    reader: FrameReader,
    shutdown: ShutdownFlag,
    config: AcquisitionConfig,
    summary: RunSummary,
}

impl<T, S> Acquisition<T, S>
where
    T: MeterTransport,
    S: RecordSink,
{
    /// Create a loop with the default poll delay
    pub fn new(link: T, sink: S, shutdown: ShutdownFlag) -> Self {
        Self::with_config(link, sink, shutdown, AcquisitionConfig::default())
    }

    /// Create a loop with custom configuration
    pub fn with_config(
        link: T,
        sink: S,
        shutdown: ShutdownFlag,
        config: AcquisitionConfig,
    ) -> Self {
        Self {
            link,
            sink,
            reader: FrameReader::new(),
            shutdown,
            config,
            summary: RunSummary::default(),
        }
    }

    /// Replace the frame reader (custom timeout or framing)
    pub fn with_reader(mut self, reader: FrameReader) -> Self {
        self.reader = reader;
        self
    }

    /// Counters so far
    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// The meter link
    pub fn link(&self) -> &T {
        &self.link
    }

    /// The record sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn cancelled_at(&self, checkpoint: Checkpoint) -> bool {
        let requested = self.shutdown.is_requested();
        if requested {
            debug!("Stop requested {}", checkpoint.as_str());
        }
        requested
    }

    /// Run one trigger → read → parse → persist cycle
    ///
    /// `observer` sees each accepted record before it is persisted. The
    /// record is synced to the sink before this returns, so the next
    /// trigger never overtakes it.
    pub fn run_cycle<F>(&mut self, observer: &mut F) -> Result<CycleOutcome, AcquireError>
    where
        F: FnMut(&Record),
    {
        if self.cancelled_at(Checkpoint::BeforeTrigger) {
            return Ok(CycleOutcome::Cancelled);
        }

        self.summary.cycles += 1;
        let frame = self.reader.request(&mut self.link)?;

        if self.cancelled_at(Checkpoint::AfterRead) {
            return Ok(CycleOutcome::Cancelled);
        }

        let Some(frame) = frame else {
            self.summary.empty += 1;
            return Ok(CycleOutcome::NoData);
        };

        let Some(measurement) = parse_frame(frame.as_bytes()) else {
            debug!(
                "Discarded frame {:?}",
                String::from_utf8_lossy(frame.as_bytes())
            );
            self.summary.discarded += 1;
            return Ok(CycleOutcome::Discarded);
        };

        let record = Record::now(measurement);

        if self.cancelled_at(Checkpoint::AfterParse) {
            return Ok(CycleOutcome::Cancelled);
        }

        observer(&record);
        self.sink.append(&record)?;
        self.summary.records += 1;
        debug!(
            "Recorded {} {} {}",
            record.measurement.mode, record.measurement.reading, record.measurement.units
        );

        Ok(CycleOutcome::Recorded(record))
    }

    /// Poll until a stop is requested or a cycle fails
    ///
    /// Consumes the loop: the link and the sink are released when this
    /// returns, on every path.
    pub fn run<F>(mut self, mut observer: F) -> Result<RunSummary, AcquireError>
    where
        F: FnMut(&Record),
    {
        info!("Acquisition started, delay {:?}", self.config.poll_delay);

        loop {
            match self.run_cycle(&mut observer) {
                Ok(CycleOutcome::Cancelled) => break,
                Ok(_) => {}
                Err(e) => {
                    error!("Acquisition stopped: {}", e);
                    return Err(e);
                }
            }

            if !self.shutdown.sleep(self.config.poll_delay) {
                debug!("Stop requested during poll delay");
                break;
            }
        }

        let summary = self.summary;
        info!(
            "Acquisition stopped: {} cycle(s), {} record(s), {} empty, {} discarded",
            summary.cycles, summary.records, summary.empty, summary.discarded
        );
        Ok(summary)
    }
}

impl<T, S> std::fmt::Debug for Acquisition<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Acquisition")
            .field("config", &self.config)
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}
