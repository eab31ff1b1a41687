//! USB-to-serial chipset families
//!
//! Meters with an RS-232 port reach the host through a USB adapter. The
//! families below cover nearly every such adapter; the selector uses them
//! to break ties when several ports look plausible.

use serde::{Deserialize, Serialize};

use crate::scanner::SerialPortInfo;

/// FTDI (Future Technology Devices International)
pub mod ftdi {
    pub const VID: u16 = 0x0403;
}

/// Silicon Labs CP210x
pub mod cp210x {
    pub const VID: u16 = 0x10C4;
}

/// WCH CH340/CH341
pub mod ch340 {
    pub const VID: u16 = 0x1A86;
}

/// Prolific PL2303
pub mod prolific {
    pub const VID: u16 = 0x067B;
}

/// Known USB-serial chipset family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chipset {
    Ftdi,
    Cp210x,
    Ch340,
    Pl2303,
}

impl Chipset {
    /// All known families
    pub const ALL: [Chipset; 4] = [
        Chipset::Ftdi,
        Chipset::Cp210x,
        Chipset::Ch340,
        Chipset::Pl2303,
    ];

    /// USB vendor ID of the family
    pub fn vid(&self) -> u16 {
        match self {
            Chipset::Ftdi => ftdi::VID,
            Chipset::Cp210x => cp210x::VID,
            Chipset::Ch340 => ch340::VID,
            Chipset::Pl2303 => prolific::VID,
        }
    }

    /// Name as it appears in manufacturer/product strings
    pub fn signature(&self) -> &'static str {
        match self {
            Chipset::Ftdi => "FTDI",
            Chipset::Cp210x => "CP210",
            Chipset::Ch340 => "CH34",
            Chipset::Pl2303 => "PL2303",
        }
    }

    /// Look up a family by vendor ID
    pub fn from_vid(vid: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.vid() == vid)
    }

    /// Whether a port belongs to this family
    ///
    /// Matches on VID, or on the signature appearing in the manufacturer or
    /// description (case-insensitive).
    pub fn matches(&self, port: &SerialPortInfo) -> bool {
        if port.vid == Some(self.vid()) {
            return true;
        }

        let signature = self.signature().to_lowercase();
        let mentions = |text: &str| text.to_lowercase().contains(&signature);

        port.manufacturer.as_deref().is_some_and(mentions) || mentions(port.description())
    }
}

/// Get adapter family name from VID
pub fn adapter_name(vid: u16) -> Option<&'static str> {
    Chipset::from_vid(vid).map(|c| c.signature())
}
