//! Measurement mode codes
//!
//! The meter prefixes every frame with a single character naming the active
//! function. The set of codes is closed; anything else maps to
//! [`Mode::Unknown`].

use std::fmt;

/// Measurement category selected by the first character of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// `A`: AC voltage/current
    Ac,
    /// `B`: continuity buzzer, `L`: diode/logic
    Diode,
    /// `C`: capacitance
    Capacitance,
    /// `D`: DC voltage/current
    Dc,
    /// `F`: frequency
    Frequency,
    /// `I`: inductance
    Inductance,
    /// `R`: resistance
    Resistance,
    /// `T`: temperature
    Temperature,
    /// Code outside the table
    Unknown,
}

impl Mode {
    /// Every code the meter is known to emit
    pub const CODES: [char; 9] = ['A', 'B', 'C', 'D', 'F', 'I', 'L', 'R', 'T'];

    /// Map a mode code to its mode, falling back to [`Mode::Unknown`]
    pub fn from_code(code: char) -> Self {
        match code {
            'A' => Mode::Ac,
            'B' | 'L' => Mode::Diode,
            'C' => Mode::Capacitance,
            'D' => Mode::Dc,
            'F' => Mode::Frequency,
            'I' => Mode::Inductance,
            'R' => Mode::Resistance,
            'T' => Mode::Temperature,
            _ => Mode::Unknown,
        }
    }

    /// Whether `code` is one of the table's keys (case-sensitive)
    pub fn is_known_code(code: char) -> bool {
        Self::CODES.contains(&code)
    }

    /// Short canonical name written to the log
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Ac => "AC",
            Mode::Diode => "DIO",
            Mode::Capacitance => "CAP",
            Mode::Dc => "DC",
            Mode::Frequency => "FR",
            Mode::Inductance => "IND",
            Mode::Resistance => "RES",
            Mode::Temperature => "TEMP",
            Mode::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
