//! Kernel logging backend.
//!
//! Routes the `log` facade to COM1. Each record becomes one line:
//! a colored `[LEVEL]` tag, the target module, then the message.
#![cfg_attr(not(test), no_std)]

use core::fmt;

use log::{Level, LevelFilter, Log, Metadata, Record};

struct SerialLogger;

static LOGGER: SerialLogger = SerialLogger;

fn label(level: Level) -> &'static str {
    match level {
        Level::Trace => "TRACE",
        Level::Debug => "DEBUG",
        Level::Info => " INFO",
        Level::Warn => " WARN",
        Level::Error => "ERROR",
    }
}

fn color(level: Level) -> &'static str {
    match level {
        Level::Trace => "\x1b[90m", // Gray
        Level::Debug => "\x1b[36m", // Cyan
        Level::Info => "\x1b[32m",  // Green
        Level::Warn => "\x1b[33m",  // Yellow
        Level::Error => "\x1b[31m", // Red
    }
}

fn write_record<W: fmt::Write>(
    out: &mut W,
    level: Level,
    target: &str,
    args: fmt::Arguments,
) -> fmt::Result {
    writeln!(out, "{}[{}]\x1b[0m {}: {}", color(level), label(level), target, args)
}

/// Serial writer for [`write_record`].
struct SerialOut;

impl fmt::Write for SerialOut {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        khal::serial::write_str(s);
        Ok(())
    }
}

impl Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let _ = write_record(&mut SerialOut, record.level(), record.target(), *record.args());
    }

    fn flush(&self) {}
}

/// Bring up COM1 and install the logger.
///
/// Records above `max_level` are discarded. Calling this twice keeps
/// the first logger but still updates the level.
pub fn init(max_level: LevelFilter) {
    let loopback_ok = khal::serial::init();
    if !install(max_level) {
        log::debug!("logger already installed, max level now {}", max_level);
    }
    if !loopback_ok {
        log::warn!("serial loopback test failed, output may be lost");
    }
}

/// Register [`LOGGER`] and set the level. Returns `false` if a logger
/// was already registered, in which case only the level changes.
fn install(max_level: LevelFilter) -> bool {
    let installed = log::set_logger(&LOGGER).is_ok();
    log::set_max_level(max_level);
    installed
}

/// Print to serial without a level tag.
pub fn print(args: fmt::Arguments) {
    khal::serial::write_fmt(args);
}

/// Print without newline
#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => {
        $crate::print(format_args!($($arg)*))
    };
}

/// Print with newline
#[macro_export]
macro_rules! println {
    () => ($crate::print!("\n"));
    ($($arg:tt)*) => {{
        $crate::print(format_args!($($arg)*));
        $crate::print(format_args!("\n"));
    }};
}
