//! Port selection
//!
//! Picks the port the meter is attached to from an enumerated port list.
//! A manual override is only validated. Otherwise ports are filtered down to
//! plausible serial adapters, sorted by name, and ports of a preferred
//! chipset family are moved to the front (keeping name order within each
//! group). The first candidate wins.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::DetectError;
use crate::scanner::SerialPortInfo;
use crate::usb_ids::Chipset;

/// Selector configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Substrings of a port name or product that mark it as a serial port
    pub serial_markers: Vec<String>,
    /// Port name prefixes that mark a serial port (e.g. Windows `COM`)
    pub name_prefixes: Vec<String>,
    /// Chipset families tried first when several candidates exist
    pub preferred_chipsets: Vec<Chipset>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            serial_markers: vec!["usb".to_string(), "acm".to_string(), "serial".to_string()],
            name_prefixes: vec!["com".to_string()],
            preferred_chipsets: vec![Chipset::Ftdi],
        }
    }
}

/// A port considered during auto-selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Port details
    pub info: SerialPortInfo,
    /// Belongs to a preferred chipset family
    pub priority: bool,
}

/// Outcome of port selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// The port to open
    pub chosen: Candidate,
    /// Other candidates, in preference order
    pub runners_up: Vec<Candidate>,
    /// Chosen by manual override rather than auto-detection
    pub manual: bool,
}

impl Selection {
    /// Name of the chosen port
    pub fn port(&self) -> &str {
        &self.chosen.info.port
    }
}

/// Chooses the meter's port
#[derive(Debug, Clone, Default)]
pub struct PortSelector {
    config: SelectorConfig,
}

impl PortSelector {
    /// Create a selector with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a selector with custom configuration
    pub fn with_config(config: SelectorConfig) -> Self {
        Self { config }
    }

    /// Select a port from `ports`, honouring an optional manual override
    pub fn select(
        &self,
        ports: &[SerialPortInfo],
        port_override: Option<&str>,
    ) -> Result<Selection, DetectError> {
        match port_override {
            Some(name) => self.validate_override(ports, name),
            None => self.auto_select(ports),
        }
    }

    /// Filtered, sorted and prioritised candidates
    pub fn candidates(&self, ports: &[SerialPortInfo]) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = ports
            .iter()
            .filter(|p| self.is_serial_candidate(p))
            .map(|p| Candidate {
                info: p.clone(),
                priority: self.is_preferred(p),
            })
            .collect();

        candidates.sort_by(|a, b| a.info.port.cmp(&b.info.port));
        // Stable sort on a bool key: priority ports first, name order kept
        candidates.sort_by_key(|c| !c.priority);
        candidates
    }

    fn validate_override(
        &self,
        ports: &[SerialPortInfo],
        name: &str,
    ) -> Result<Selection, DetectError> {
        let Some(info) = ports.iter().find(|p| p.port == name) else {
            return Err(DetectError::PortNotFound {
                port: name.to_string(),
                available: ports.iter().map(|p| p.port.clone()).collect(),
            });
        };

        info!("Using manually specified port: {}", name);
        Ok(Selection {
            chosen: Candidate {
                info: info.clone(),
                priority: self.is_preferred(info),
            },
            runners_up: Vec::new(),
            manual: true,
        })
    }

    fn auto_select(&self, ports: &[SerialPortInfo]) -> Result<Selection, DetectError> {
        let mut candidates = self.candidates(ports).into_iter();

        let Some(chosen) = candidates.next() else {
            return Err(DetectError::NoCandidates {
                ports: ports.to_vec(),
            });
        };
        let runners_up: Vec<_> = candidates.collect();

        info!("Auto-selected port: {}", chosen.info.summary());
        if let Some(adapter) = chosen.info.adapter() {
            info!("  Adapter: {}", adapter);
        }
        for other in &runners_up {
            info!("  Other candidate (ignored): {}", other.info.summary());
        }

        Ok(Selection {
            chosen,
            runners_up,
            manual: false,
        })
    }

    /// Name or product suggests a USB-serial or plain serial device
    fn is_serial_candidate(&self, port: &SerialPortInfo) -> bool {
        let name = port.port.to_lowercase();
        let product = port.product.as_deref().unwrap_or_default().to_lowercase();

        self.config
            .serial_markers
            .iter()
            .map(|m| m.to_lowercase())
            .any(|m| name.contains(&m) || product.contains(&m))
            || self
                .config
                .name_prefixes
                .iter()
                .any(|prefix| name.starts_with(&prefix.to_lowercase()))
    }

    fn is_preferred(&self, port: &SerialPortInfo) -> bool {
        self.config
            .preferred_chipsets
            .iter()
            .any(|chipset| chipset.matches(port))
    }
}
