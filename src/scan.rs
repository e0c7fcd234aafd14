// The probe loop: one connection per candidate rate, closed before the next.
use std::io::Write;
use std::time::Duration;

use crate::config::ScanParameters;
use crate::error::{Result, ScanError};
use crate::report::Reporter;

pub mod port;
pub mod response;

use port::Connector;
use response::KnownTokens;

/// The ascending candidate sequence, `start` up to but excluding `end`.
pub fn candidate_rates(parameters: &ScanParameters) -> impl Iterator<Item = u32> {
    (parameters.start_baud..parameters.end_baud).step_by(parameters.step.max(1) as usize)
}

/// Result of a single open/write/read/close cycle.
#[derive(Debug)]
pub enum ProbeOutcome {
    Matched(String),
    NoMatch,
    Failed(ScanError),
}

/// Result of a scan that was not aborted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Matched { baud_rate: u32, token: String },
    Exhausted { attempted: usize },
}

pub struct Scanner<'a, C: Connector> {
    connector: C,
    device: String,
    timeout: Duration,
    parameters: ScanParameters,
    tokens: KnownTokens,
    reporter: &'a Reporter,
}

impl<'a, C: Connector> Scanner<'a, C> {
    pub fn new(
        connector: C,
        device: &str,
        timeout: Duration,
        parameters: ScanParameters,
        reporter: &'a Reporter,
    ) -> Scanner<'a, C> {
        let tokens = KnownTokens::new(parameters.known_good.iter().cloned());
        Scanner {
            connector,
            device: device.to_string(),
            timeout,
            parameters,
            tokens,
            reporter,
        }
    }

    /// Probes every candidate rate in order until one answers with a known word.
    /// The first failing probe aborts the whole scan.
    pub fn run(&mut self) -> Result<ScanOutcome> {
        let mut attempted = 0;
        for baud_rate in candidate_rates(&self.parameters) {
            attempted += 1;
            match self.probe(baud_rate) {
                ProbeOutcome::Matched(token) => {
                    self.reporter
                        .warn(format_args!("Found known good clear text word: {}", token));
                    self.reporter.warn(format_args!("Exiting..."));
                    return Ok(ScanOutcome::Matched { baud_rate, token });
                }
                ProbeOutcome::NoMatch => continue,
                ProbeOutcome::Failed(e) => {
                    self.reporter
                        .error(format_args!("Probe at {} baud failed:", baud_rate));
                    self.reporter.error(format_args!("{}", e));
                    return Err(e);
                }
            }
        }
        self.reporter.warn(format_args!(
            "No known good clear text word found after {} baud rates",
            attempted
        ));
        Ok(ScanOutcome::Exhausted { attempted })
    }

    /// One attempt at `baud_rate`. The connection is released before returning.
    pub fn probe(&mut self, baud_rate: u32) -> ProbeOutcome {
        self.reporter
            .debug(format_args!("Testing baud rate {}", baud_rate));
        let mut connection = match self.connector.open(&self.device, baud_rate, self.timeout) {
            Ok(connection) => connection,
            Err(e) => return ProbeOutcome::Failed(e),
        };
        let outcome = match self.exchange(&mut connection, baud_rate) {
            Ok(Some(token)) => ProbeOutcome::Matched(token),
            Ok(None) => ProbeOutcome::NoMatch,
            Err(e) => ProbeOutcome::Failed(e),
        };
        self.reporter.debug(format_args!(
            "Closing serial connection for baud rate: {}",
            baud_rate
        ));
        drop(connection);
        outcome
    }

    fn exchange(&self, connection: &mut C::Port, baud_rate: u32) -> Result<Option<String>> {
        let io_error = |source| ScanError::Io { baud_rate, source };

        self.reporter
            .debug(format_args!("Sending message: {:?}", self.parameters.payload));
        connection
            .write_all(self.parameters.payload.as_bytes())
            .map_err(io_error)?;
        connection.flush().map_err(io_error)?;

        let data = port::read_response(connection, self.parameters.read_size, self.timeout)
            .map_err(io_error)?;
        let text = response::decode(baud_rate, &data)?;
        for line in response::lines(text) {
            if let Some(token) = self.tokens.match_line(line) {
                return Ok(Some(token.to_string()));
            }
            self.reporter.debug(format_args!("Received: {}", line));
        }
        Ok(None)
    }
}
