/*
 * Driver Logging
 *
 * The driver logs through the `log` facade. This module provides a
 * ready-made `log::Log` implementation for platforms that do not have
 * one: records are formatted and handed to a `LogSink` (serial port,
 * RTT channel, test buffer...).
 *
 * Nothing in the interrupt path logs, so the sink is only ever called
 * from task context.
 */

use core::fmt;

use log::{LevelFilter, Metadata, Record, SetLoggerError};
use spin::Once;

/// Destination for formatted log lines
pub trait LogSink: Sync {
    fn write_line(&self, level: log::Level, target: &str, args: &fmt::Arguments<'_>);
}

/// `log::Log` implementation forwarding to a `LogSink`
struct GpioLogger {
    sink: Once<&'static dyn LogSink>,
}

impl log::Log for GpioLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Some(sink) = self.sink.get() {
            sink.write_line(record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: GpioLogger = GpioLogger { sink: Once::new() };

/// Install the driver logger
///
/// # Errors
///
/// Returns `SetLoggerError` if a logger is already installed.
pub fn init(sink: &'static dyn LogSink, level: LevelFilter) -> Result<(), SetLoggerError> {
    LOGGER.sink.call_once(|| sink);
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}
