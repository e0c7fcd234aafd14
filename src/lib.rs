//! Finds the baud rate of an unknown serial link by sending a probe at each
//! candidate rate and looking for legible words in what comes back.

pub mod config;
pub mod error;
pub mod report;
pub mod scan;

pub use error::{Result, ScanError};
