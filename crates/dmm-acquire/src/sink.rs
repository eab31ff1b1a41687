//! Durable CSV log
//!
//! Records are appended one row at a time and synced to disk before
//! [`RecordSink::append`] returns, so a crash or power loss costs at most the
//! row being written.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use dmm_protocol::{Record, CSV_HEADER};
use fs2::FileExt;
use tracing::{debug, info, warn};

use crate::error::SinkError;

/// Destination for accepted records
pub trait RecordSink {
    /// Persist one record durably before returning
    fn append(&mut self, record: &Record) -> Result<(), SinkError>;
}

impl<S: RecordSink + ?Sized> RecordSink for Box<S> {
    fn append(&mut self, record: &Record) -> Result<(), SinkError> {
        (**self).append(record)
    }
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn append(&mut self, record: &Record) -> Result<(), SinkError> {
        (**self).append(record)
    }
}

/// Append-only CSV file holding one header row
pub struct CsvSink {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows: u64,
}

impl CsvSink {
    /// Open (or create) `path` for appending
    ///
    /// Takes an exclusive advisory lock on the file. The header is written
    /// only when the file is empty at open time.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let open_err = |source| SinkError::Open {
            path: path.clone(),
            source,
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(open_err)?;

        file.try_lock_exclusive().map_err(|source| SinkError::Locked {
            path: path.clone(),
            source,
        })?;

        let fresh = file.metadata().map_err(open_err)?.len() == 0;

        // CRLF rows match what spreadsheet tools and Python's csv module emit
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::CRLF)
            .from_writer(file);

        if fresh {
            writer.write_record(CSV_HEADER)?;
            writer.flush().map_err(SinkError::Sync)?;
            writer.get_ref().sync_data().map_err(SinkError::Sync)?;
            info!("Created log {}", path.display());
        } else {
            info!("Appending to existing log {}", path.display());
        }

        Ok(Self {
            path,
            writer,
            rows: 0,
        })
    }

    /// Rows appended through this handle
    pub fn rows_written(&self) -> u64 {
        self.rows
    }
}

impl RecordSink for CsvSink {
    fn append(&mut self, record: &Record) -> Result<(), SinkError> {
        self.writer.write_record(record.fields())?;
        self.writer.flush().map_err(SinkError::Sync)?;
        self.writer.get_ref().sync_data().map_err(SinkError::Sync)?;
        self.rows += 1;
        debug!("Appended row {} to {}", self.rows, self.path.display());
        Ok(())
    }
}

impl Drop for CsvSink {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            warn!("Failed to flush {} on close: {}", self.path.display(), e);
        }
        // The lock is released when the file handle closes
        info!(
            "Closed log {} ({} row(s) this session)",
            self.path.display(),
            self.rows
        );
    }
}

impl std::fmt::Debug for CsvSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvSink")
            .field("path", &self.path)
            .field("rows", &self.rows)
            .finish()
    }
}
