//! Log sink installation.
//!
//! The engine itself only emits `tracing` events. A host that wants to see
//! them either installs its own subscriber or lets [`init_logging`] install
//! a formatting subscriber writing to the console or to a file.

use crate::error::CoreResult;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Where log output goes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogSink {
    /// No subscriber is installed.
    #[default]
    None,
    /// Write to standard error.
    Console,
    /// Append to a file.
    File(PathBuf),
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogConfig {
    /// Destination of log output.
    pub sink: LogSink,
    /// Emit debug-level events when true, info-level otherwise.
    pub verbose: bool,
}

impl LogConfig {
    /// Creates a logging configuration for the given sink.
    #[must_use]
    pub fn new(sink: LogSink) -> Self {
        Self {
            sink,
            verbose: false,
        }
    }

    /// Sets verbosity.
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn filter(&self) -> EnvFilter {
        if self.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    }
}

/// Installs a global subscriber for the configured sink.
///
/// Returns `Ok(true)` if this call installed the subscriber, `Ok(false)` if
/// the sink is `None` or a global subscriber already exists.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
pub fn init_logging(config: &LogConfig) -> CoreResult<bool> {
    let installed = match &config.sink {
        LogSink::None => false,
        LogSink::Console => tracing_subscriber::fmt()
            .with_env_filter(config.filter())
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok(),
        LogSink::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(config.filter())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .is_ok()
        }
    };
    Ok(installed)
}
