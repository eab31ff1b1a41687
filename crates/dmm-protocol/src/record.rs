//! Measurement and log record types

use chrono::{DateTime, Local};

use crate::mode::Mode;

/// Column names of the persisted log, in order
pub const CSV_HEADER: [&str; 5] = ["date", "time", "mode", "reading", "units"];

/// Date column format
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Time column format (millisecond precision)
pub const TIME_FORMAT: &str = "%H:%M:%S%.3f";

/// One decoded meter reading
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measurement {
    /// Measurement category from the mode code
    pub mode: Mode,
    /// Reading token exactly as the meter printed it (may be empty)
    pub reading: String,
    /// Units text following the reading (may be empty)
    pub units: String,
    /// Decoded, trimmed frame text
    pub raw: String,
}

/// A timestamped measurement ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Local wall-clock time the frame was received
    pub captured_at: DateTime<Local>,
    /// Parsed measurement
    pub measurement: Measurement,
}

impl Record {
    /// Stamp a measurement with the given time
    pub fn new(captured_at: DateTime<Local>, measurement: Measurement) -> Self {
        Self {
            captured_at,
            measurement,
        }
    }

    /// Stamp a measurement with the current local time
    pub fn now(measurement: Measurement) -> Self {
        Self::new(Local::now(), measurement)
    }

    /// `YYYY-MM-DD`
    pub fn date(&self) -> String {
        self.captured_at.format(DATE_FORMAT).to_string()
    }

    /// `HH:MM:SS.mmm`
    pub fn time(&self) -> String {
        self.captured_at.format(TIME_FORMAT).to_string()
    }

    /// Row fields in [`CSV_HEADER`] order
    pub fn fields(&self) -> [String; 5] {
        [
            self.date(),
            self.time(),
            self.measurement.mode.as_str().to_string(),
            self.measurement.reading.clone(),
            self.measurement.units.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Record {
        let at = Local
            .with_ymd_and_hms(2024, 3, 9, 7, 5, 3)
            .single()
            .unwrap()
            + chrono::Duration::milliseconds(42);
        Record::new(
            at,
            Measurement {
                mode: Mode::Dc,
                reading: "007.50".into(),
                units: "V".into(),
                raw: "DC 007.50 V".into(),
            },
        )
    }

    #[test]
    fn test_date_and_time_format() {
        let record = sample();
        assert_eq!(record.date(), "2024-03-09");
        assert_eq!(record.time(), "07:05:03.042");
    }

    #[test]
    fn test_fields_order() {
        let fields = sample().fields();
        assert_eq!(
            fields,
            [
                "2024-03-09".to_string(),
                "07:05:03.042".to_string(),
                "DC".to_string(),
                "007.50".to_string(),
                "V".to_string(),
            ]
        );
    }
}
