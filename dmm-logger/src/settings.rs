//! Application settings

use std::path::{Path, PathBuf};

use dmm_detect::Chipset;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Log file used when neither the command line nor the settings name one
pub const DEFAULT_OUTPUT_FILE: &str = "Protek-506-log.txt";

/// Persistent defaults, overridden by command-line options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Output CSV file
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,
    /// Seconds between polls
    #[serde(default = "default_poll_delay")]
    pub poll_delay_secs: f64,
    /// How long to wait for a complete frame (ms)
    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: u64,
    /// Adapter families moved to the front during auto-selection
    #[serde(default = "default_preferred_chipsets")]
    pub preferred_chipsets: Vec<Chipset>,
}

fn default_output_file() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_FILE)
}

fn default_poll_delay() -> f64 {
    0.2
}

fn default_read_timeout() -> u64 {
    1000
}

fn default_preferred_chipsets() -> Vec<Chipset> {
    vec![Chipset::Ftdi]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_file: default_output_file(),
            poll_delay_secs: default_poll_delay(),
            read_timeout_ms: default_read_timeout(),
            preferred_chipsets: default_preferred_chipsets(),
        }
    }
}

impl Settings {
    /// Get the XDG config directory for dmm-logger
    /// Uses $XDG_CONFIG_HOME/dmm-logger, falls back to ~/.config/dmm-logger
    fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("dmm-logger"));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join("dmm-logger"))
    }

    /// Get the default settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from the default location
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load settings from `path`
    ///
    /// A missing file yields defaults silently; an unreadable or invalid one
    /// yields defaults with a warning.
    pub fn load_from(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings at {}", path.display());
                return Self::default();
            }
            Err(e) => {
                warn!("Cannot read settings {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(settings) => {
                debug!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                warn!("Ignoring invalid settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}
