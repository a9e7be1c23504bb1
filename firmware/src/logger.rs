//! Console logger.
//!
//! Routes `log` records to a board-supplied text sink (usually the USB
//! serial console). Until a sink is installed records are dropped.

use alloc::boxed::Box;
use core::fmt::{self, Write};

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use spin::Mutex;

/// Text sink for log lines.
pub type Sink = Box<dyn Write + Send>;

static SINK: Mutex<Option<Sink>> = Mutex::new(None);

static LOGGER: ConsoleLogger = ConsoleLogger;

/// `log` backend writing to the installed sink.
pub struct ConsoleLogger;

fn prefix(level: Level) -> &'static str {
    match level {
        Level::Trace => "[TRACE]",
        Level::Debug => "[DEBUG]",
        Level::Info => "[INFO ]",
        Level::Warn => "[WARN ]",
        Level::Error => "[ERROR]",
    }
}

/// Write one formatted log line.
pub fn write_line(out: &mut dyn Write, level: Level, args: fmt::Arguments<'_>) -> fmt::Result {
    writeln!(out, "{} {}", prefix(level), args)
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Some(sink) = SINK.lock().as_mut() {
            // A failing console has nowhere to report to.
            let _ = write_line(sink.as_mut(), record.level(), *record.args());
        }
    }

    fn flush(&self) {}
}

/// Install `sink` and register the logger.
pub fn init(sink: Sink, level: LevelFilter) -> Result<(), SetLoggerError> {
    *SINK.lock() = Some(sink);
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

/// Change the max level after boot (e.g. once the config is read).
pub fn set_level(level: LevelFilter) {
    log::set_max_level(level);
}
