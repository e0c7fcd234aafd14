use baud_scan::config;
use baud_scan::report::Reporter;
use baud_scan::scan::port::SerialConnector;
use baud_scan::scan::{ScanOutcome, Scanner};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[cfg(windows)]
const DEFAULT_DEVICE: &str = "COM1";
#[cfg(not(windows))]
const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";

// Exit status when every candidate rate was tried without a match.
const EXIT_NOT_FOUND: u8 = 3;

/// Serial Baud Rate Scanner.
#[derive(Parser)]
struct Cli {
    /// Set device.
    #[arg(short = 'd', value_name = "DEV", default_value = DEFAULT_DEVICE)]
    dev: String,

    /// Verbose mode.
    #[arg(short = 'v')]
    verbose: bool,

    /// JSON file overriding line settings, rate range, payload and tokens.
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Cli::parse();

    let config = match config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let reporter = match Reporter::to_file_and_terminal(
        Path::new(&config.scan_parameters.log_file),
        args.verbose,
    ) {
        Ok(reporter) => reporter,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let connector = match SerialConnector::new(&config.port_parameters) {
        Ok(connector) => connector,
        Err(e) => {
            reporter.error(format_args!("{}", e));
            return ExitCode::FAILURE;
        }
    };

    let mut scanner = Scanner::new(
        connector,
        &args.dev,
        config.port_parameters.timeout(),
        config.scan_parameters,
        &reporter,
    );
    let status = match scanner.run() {
        Ok(ScanOutcome::Matched { .. }) => ExitCode::SUCCESS,
        Ok(ScanOutcome::Exhausted { .. }) => ExitCode::from(EXIT_NOT_FOUND),
        Err(_) => ExitCode::FAILURE,
    };
    reporter.flush();
    status
}
