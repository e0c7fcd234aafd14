// Scan configuration. Everything has a default so the tool runs without a file;
// a JSON file can override any part of it.
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};

// Longest read window accepted from a file.
const MAX_TIMEOUT_MSEC: u64 = 60_000;

pub mod config_json;

pub use config_json::{PortParameters, ScanParameters};

// The root configuration structure.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ScanConfig {
    #[serde(default)]
    pub port_parameters: PortParameters,
    #[serde(default)]
    pub scan_parameters: ScanParameters,
}

impl ScanConfig {
    /// Checks everything that would otherwise only fail once a port is open.
    pub fn validate(&self) -> Result<()> {
        config_json::decode_char_size(self.port_parameters.char_size)?;
        config_json::decode_parity(&self.port_parameters.parity)?;
        config_json::decode_stop_bits(self.port_parameters.stop_bits)?;
        if self.port_parameters.timeout_msec == 0
            || self.port_parameters.timeout_msec > MAX_TIMEOUT_MSEC
        {
            return Err(ScanError::Config(format!(
                "timeout_msec must be between 1 and {}, got {}",
                MAX_TIMEOUT_MSEC, self.port_parameters.timeout_msec
            )));
        }

        let scan = &self.scan_parameters;
        if scan.step == 0 {
            return Err(ScanError::Config("step must be positive".to_string()));
        }
        if scan.start_baud >= scan.end_baud {
            return Err(ScanError::Config(format!(
                "empty baud range {}..{}",
                scan.start_baud, scan.end_baud
            )));
        }
        if scan.read_size == 0 {
            return Err(ScanError::Config("read_size must be positive".to_string()));
        }
        if scan.known_good.is_empty() {
            return Err(ScanError::Config("known_good must not be empty".to_string()));
        }
        Ok(())
    }
}

pub fn read_configuration(config_path: &Path) -> Result<ScanConfig> {
    let config_str = fs::read_to_string(config_path).map_err(ScanError::ConfigFile)?;
    let config: ScanConfig = serde_json::from_str(&config_str)?;
    config.validate()?;
    Ok(config)
}

/// Reads the file when one is given, otherwise falls back to the defaults.
pub fn load(config_path: Option<&Path>) -> Result<ScanConfig> {
    match config_path {
        Some(path) => read_configuration(path),
        None => Ok(ScanConfig::default()),
    }
}
