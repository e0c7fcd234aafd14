//! Error types for the baud rate scan.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScanError>;

#[derive(Error, Debug)]
pub enum ScanError {
    /// The port could not be opened or configured at this rate.
    #[error("Serial port error at {baud_rate} baud: {source}")]
    Device {
        baud_rate: u32,
        #[source]
        source: serialport::Error,
    },

    /// Writing the probe or reading the response failed.
    #[error("IO error at {baud_rate} baud: {source}")]
    Io {
        baud_rate: u32,
        #[source]
        source: std::io::Error,
    },

    /// The response bytes are not valid UTF-8.
    #[error("Response at {baud_rate} baud is not valid UTF-8: {source}")]
    Decode {
        baud_rate: u32,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to read configuration file: {0}")]
    ConfigFile(#[source] std::io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ConfigFormat(#[from] serde_json::Error),

    #[error("Failed to open log file: {0}")]
    LogFile(#[source] std::io::Error),
}
