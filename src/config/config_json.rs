use serde::{Deserialize, Serialize};
use serialport::{DataBits, Parity, StopBits};
use std::time::Duration;

use crate::error::{Result, ScanError};

fn default_char_size() -> u32 {
    8
}
fn default_parity() -> String {
    "None".to_string()
}
fn default_stop_bits() -> u32 {
    1
}
fn default_timeout_msec() -> u64 {
    500
}

fn default_start_baud() -> u32 {
    1100
}
fn default_end_baud() -> u32 {
    256000
}
fn default_step() -> u32 {
    100
}
fn default_payload() -> String {
    "test\n".to_string()
}
fn default_read_size() -> usize {
    1024
}
fn default_known_good() -> Vec<String> {
    ["login", "error", "invalid", "command", "not", "found"]
        .iter()
        .map(|word| word.to_string())
        .collect()
}
fn default_log_file() -> String {
    "scan.log".to_string()
}

// Line settings applied to every connection, whatever the baud rate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PortParameters {
    #[serde(default = "default_char_size")]
    pub char_size: u32,
    #[serde(default = "default_parity")]
    pub parity: String,
    #[serde(default = "default_stop_bits")]
    pub stop_bits: u32,
    #[serde(default = "default_timeout_msec")]
    pub timeout_msec: u64,
}

impl Default for PortParameters {
    fn default() -> Self {
        PortParameters {
            char_size: default_char_size(),
            parity: default_parity(),
            stop_bits: default_stop_bits(),
            timeout_msec: default_timeout_msec(),
        }
    }
}

impl PortParameters {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_msec)
    }
}

// What to send, what to look for and where to record it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScanParameters {
    #[serde(default = "default_start_baud")]
    pub start_baud: u32,
    /// Exclusive upper bound of the candidate sequence.
    #[serde(default = "default_end_baud")]
    pub end_baud: u32,
    #[serde(default = "default_step")]
    pub step: u32,
    #[serde(default = "default_payload")]
    pub payload: String,
    #[serde(default = "default_read_size")]
    pub read_size: usize,
    #[serde(default = "default_known_good")]
    pub known_good: Vec<String>,
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

impl Default for ScanParameters {
    fn default() -> Self {
        ScanParameters {
            start_baud: default_start_baud(),
            end_baud: default_end_baud(),
            step: default_step(),
            payload: default_payload(),
            read_size: default_read_size(),
            known_good: default_known_good(),
            log_file: default_log_file(),
        }
    }
}

pub fn decode_char_size(char_size: u32) -> Result<DataBits> {
    match char_size {
        5 => Ok(DataBits::Five),
        6 => Ok(DataBits::Six),
        7 => Ok(DataBits::Seven),
        8 => Ok(DataBits::Eight),
        _ => Err(ScanError::Config(format!(
            "unsupported char size {}",
            char_size
        ))),
    }
}

pub fn decode_parity(parity: &str) -> Result<Parity> {
    match parity {
        "None" | "none" => Ok(Parity::None),
        "Odd" | "odd" => Ok(Parity::Odd),
        "Even" | "even" => Ok(Parity::Even),
        _ => Err(ScanError::Config(format!("unsupported parity {:?}", parity))),
    }
}

pub fn decode_stop_bits(stop_bits: u32) -> Result<StopBits> {
    match stop_bits {
        1 => Ok(StopBits::One),
        2 => Ok(StopBits::Two),
        _ => Err(ScanError::Config(format!(
            "unsupported stop bits {}",
            stop_bits
        ))),
    }
}

#[cfg(test)]
#[test]
fn test_decode_line_settings() {
    assert_eq!(decode_char_size(7).unwrap(), DataBits::Seven);
    assert_eq!(decode_parity("Even").unwrap(), Parity::Even);
    assert_eq!(decode_stop_bits(2).unwrap(), StopBits::Two);
    assert!(decode_char_size(9).is_err());
    assert!(decode_parity("Mark").is_err());
    assert!(decode_stop_bits(0).is_err());
}
