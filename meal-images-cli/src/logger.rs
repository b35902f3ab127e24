//! Terminal logger.
//!
//! `info` goes to stdout as plain lines so command output reads like normal
//! program output; `warn` and `error` go to stderr. `--verbose` adds
//! timestamps and debug messages, `--quiet` drops everything below `warn`.
//! With `--logfile`, every emitted line is also appended to the file with
//! ANSI color codes stripped.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::CliError;

/// Only our own crates log; dependency chatter (HTTP internals) is dropped.
const TARGET_PREFIX: &str = "meal_images";

pub(crate) struct CliLogger {
    level: LevelFilter,
    timestamps: bool,
    file: Option<Mutex<File>>,
}

impl CliLogger {
    fn new(quiet: bool, verbose: bool, file: Option<File>) -> Self {
        let level = if verbose {
            LevelFilter::Debug
        } else if quiet {
            LevelFilter::Warn
        } else {
            LevelFilter::Info
        };
        Self {
            level,
            timestamps: verbose,
            file: file.map(Mutex::new),
        }
    }

    fn format_line(&self, level: Level, message: &str) -> String {
        if self.timestamps {
            format!(
                "{} {:<5} {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                level,
                message
            )
        } else {
            message.to_string()
        }
    }
}

impl Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.target().starts_with(TARGET_PREFIX)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.format_line(record.level(), &record.args().to_string());

        match record.level() {
            Level::Error | Level::Warn => eprintln!("{line}"),
            _ => println!("{line}"),
        }

        if let Some(file) = &self.file {
            if let Ok(mut f) = file.lock() {
                let _ = writeln!(f, "{}", strip_ansi_escapes::strip_str(&line));
            }
        }
    }

    fn flush(&self) {
        if let Some(file) = &self.file {
            if let Ok(mut f) = file.lock() {
                let _ = f.flush();
            }
        }
    }
}

/// Install the logger for the process.
pub(crate) fn init(quiet: bool, verbose: bool, logfile: Option<&Path>) -> Result<(), CliError> {
    let file = match logfile {
        Some(path) => Some(OpenOptions::new().create(true).append(true).open(path)?),
        None => None,
    };
    let logger = CliLogger::new(quiet, verbose, file);
    let level = logger.level;
    log::set_boxed_logger(Box::new(logger))
        .map_err(|e| CliError::other(format!("failed to install logger: {e}")))?;
    log::set_max_level(level);
    Ok(())
}
