//! Custom logging module.
//!
//! This module provides the `log` backend used by the application. Records
//! are timestamped and written to stderr so they never mix with command
//! output on stdout.

use crate::error::{AppError, AppResult};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::io::Write;
use std::sync::Mutex;

/// Format a log record into a string for display
///
pub fn format_log(record: &Record) -> String {
    let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");
    let level_str = match record.level() {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    };
    format!("{} {} {}", timestamp, level_str, record.args())
}

type LogCallback = Box<dyn Fn(String) + Send + Sync>;

/// Logger writing formatted records at or above a level to a sink, and to
/// a callback when one is registered
///
pub struct Logger {
    level: LevelFilter,
    sink: Mutex<Box<dyn Write + Send>>,
    log_callback: Mutex<Option<LogCallback>>,
}

impl Logger {
    pub fn new(level: LevelFilter, sink: Box<dyn Write + Send>) -> Self {
        Logger {
            level,
            sink: Mutex::new(sink),
            log_callback: Mutex::new(None),
        }
    }

    pub fn set_log_callback(&self, callback: LogCallback) {
        if let Ok(mut guard) = self.log_callback.lock() {
            *guard = Some(callback);
        }
    }

    /// Install a stderr logger as the global `log` backend.
    ///
    pub fn init(level: LevelFilter) -> AppResult<()> {
        let logger = Logger::new(level, Box::new(std::io::stderr()));
        log::set_boxed_logger(Box::new(logger)).map_err(|e| AppError::Logger(e.to_string()))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let line = format_log(record);
            // Dropped when the sink is poisoned or fails
            if let Ok(mut sink) = self.sink.lock() {
                let _ = writeln!(sink, "{}", line);
            }
            if let Ok(callback) = self.log_callback.lock() {
                if let Some(ref cb) = *callback {
                    cb(line);
                }
            }
        }
    }

    fn flush(&self) {
        if let Ok(mut sink) = self.sink.lock() {
            let _ = sink.flush();
        }
    }
}
