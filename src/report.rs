// Scan reporting. Two simplelog sinks combined into one logger that is owned by
// the caller and handed to the scanner, instead of being installed globally.
use log::{Level, LevelFilter, Log, Record};
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::error::{Result, ScanError};

const TARGET: &str = "baud_scan";

// Every interactive line goes to stderr so stdout stays clean.
const TERMINAL_MODE: TerminalMode = TerminalMode::Stderr;

/// Level of the interactive sink. The persistent sink always records debug.
pub fn interactive_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

fn file_config() -> Config {
    ConfigBuilder::new()
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .set_time_format_rfc3339()
        .build()
}

fn plain_config() -> Config {
    ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build()
}

pub struct Reporter {
    logger: Box<CombinedLogger>,
}

impl Reporter {
    pub fn new(persistent: Box<dyn SharedLogger>, interactive: Box<dyn SharedLogger>) -> Reporter {
        Reporter {
            logger: CombinedLogger::new(vec![persistent, interactive]),
        }
    }

    /// Appends to `log_path` and prints warnings (everything, if verbose) to stderr.
    pub fn to_file_and_terminal(log_path: &Path, verbose: bool) -> Result<Reporter> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .map_err(ScanError::LogFile)?;
        Ok(Reporter::new(
            WriteLogger::new(LevelFilter::Debug, file_config(), file),
            TermLogger::new(
                interactive_level(verbose),
                plain_config(),
                TERMINAL_MODE,
                ColorChoice::Auto,
            ),
        ))
    }

    /// Same levels as `to_file_and_terminal`, over arbitrary writers and without timestamps.
    pub fn with_writers<P, I>(persistent: P, interactive: I, verbose: bool) -> Reporter
    where
        P: Write + Send + 'static,
        I: Write + Send + 'static,
    {
        Reporter::new(
            WriteLogger::new(LevelFilter::Debug, plain_config(), persistent),
            WriteLogger::new(interactive_level(verbose), plain_config(), interactive),
        )
    }

    pub fn log(&self, level: Level, args: fmt::Arguments) {
        self.logger.log(
            &Record::builder()
                .args(args)
                .level(level)
                .target(TARGET)
                .module_path_static(Some(module_path!()))
                .build(),
        );
    }

    pub fn debug(&self, args: fmt::Arguments) {
        self.log(Level::Debug, args);
    }

    pub fn warn(&self, args: fmt::Arguments) {
        self.log(Level::Warn, args);
    }

    pub fn error(&self, args: fmt::Arguments) {
        self.log(Level::Error, args);
    }

    pub fn flush(&self) {
        self.logger.flush();
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::SharedBuffer;
    use super::*;
    use std::fs;

    #[test]
    fn quiet_terminal_only_gets_warnings() {
        let persistent = SharedBuffer::default();
        let interactive = SharedBuffer::default();
        let reporter = Reporter::with_writers(persistent.clone(), interactive.clone(), false);

        reporter.debug(format_args!("Testing baud rate {}", 1100));
        reporter.warn(format_args!("Found known good clear text word: {}", "login"));

        assert!(persistent.contents().contains("Testing baud rate 1100"));
        assert!(persistent.contents().contains("Found known good clear text word: login"));
        assert!(!interactive.contents().contains("Testing baud rate 1100"));
        assert!(interactive.contents().contains("Found known good clear text word: login"));
    }

    #[test]
    fn verbose_terminal_gets_debug() {
        let persistent = SharedBuffer::default();
        let interactive = SharedBuffer::default();
        let reporter = Reporter::with_writers(persistent.clone(), interactive.clone(), true);

        reporter.debug(format_args!("Received: {}", "garbage"));
        assert!(interactive.contents().contains("Received: garbage"));
        assert_eq!(persistent.contents(), interactive.contents());
    }

    #[test]
    fn terminal_output_stays_off_stdout() {
        assert!(matches!(TERMINAL_MODE, TerminalMode::Stderr));
    }

    #[test]
    fn log_file_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.log");
        fs::write(&path, "earlier run\n").unwrap();

        let reporter = Reporter::to_file_and_terminal(&path, false).unwrap();
        reporter.debug(format_args!("Testing baud rate {}", 1200));
        reporter.flush();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("earlier run\n"));
        assert!(contents.contains("Testing baud rate 1200"));
    }
}
