//! TEAM_221: Kernel Logger implementation.
//! TEAM_431: Moved out of the kernel binary so library crates and host tests
//! share the same sink.
//!
//! Implements the `log::Log` trait to route log messages to a console writer
//! supplied by the embedding kernel (serial port, framebuffer, or stderr on
//! the host).

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};

use log::{LevelFilter, Metadata, Record, SetLoggerError};
use spin::{Mutex, Once};

/// Console sink for formatted log lines.
pub type ConsoleWriter = fn(fmt::Arguments<'_>);

/// Global logger instance
static LOGGER: KernelLogger = KernelLogger {
    writer: Once::new(),
    show_level: AtomicBool::new(false),
    muted: Mutex::new(&[]),
};

struct KernelLogger {
    writer: Once<ConsoleWriter>,
    show_level: AtomicBool,
    /// Target prefixes whose records are dropped (noisy external crates).
    muted: Mutex<&'static [&'static str]>,
}

impl log::Log for KernelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let target = record.metadata().target();
        if self.muted.lock().iter().any(|prefix| target.starts_with(prefix)) {
            return;
        }
        let Some(write) = self.writer.get() else {
            return;
        };
        if self.show_level.load(Ordering::Relaxed) {
            write(format_args!("{:<5} {}", record.level(), record.args()));
        } else {
            write(format_args!("{}", record.args()));
        }
    }

    fn flush(&self) {}
}

/// Initialize the logger.
///
/// # Arguments
/// * `max_level` - The maximum log level to display.
/// * `writer` - Where formatted lines go.
/// * `show_level` - Prefix each line with its level.
pub fn init(
    max_level: LevelFilter,
    writer: ConsoleWriter,
    show_level: bool,
) -> Result<(), SetLoggerError> {
    LOGGER.writer.call_once(|| writer);
    LOGGER.show_level.store(show_level, Ordering::Relaxed);
    log::set_logger(&LOGGER)?;
    log::set_max_level(max_level);
    Ok(())
}

/// Drop every record whose target starts with one of `prefixes`,
/// e.g. `&["virtio_drivers"]`. Replaces the previous list.
pub fn mute_targets(prefixes: &'static [&'static str]) {
    *LOGGER.muted.lock() = prefixes;
}

/// Change the runtime filter after `init`.
pub fn set_level(max_level: LevelFilter) {
    log::set_max_level(max_level);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::String;
    use std::sync::Mutex;

    static CAPTURED: Mutex<String> = Mutex::new(String::new());

    fn capture(args: fmt::Arguments<'_>) {
        use fmt::Write;
        let mut out = CAPTURED.lock().unwrap();
        out.write_fmt(args).unwrap();
        out.push('\n');
    }

    #[test]
    fn test_routes_records_and_filters_by_level_and_target() {
        init(LevelFilter::Debug, capture, true).unwrap();

        log::debug!("[PROC] created pid {}", 3);
        log::trace!("[PROC] hidden");
        set_level(LevelFilter::Warn);
        log::info!("[PROC] also hidden");
        log::warn!("[PROC] kept");

        mute_targets(&["virtio_drivers", "noisy"]);
        log::warn!(target: "virtio_drivers::queue", "hidden device chatter");
        log::warn!(target: "noisy", "hidden too");
        log::warn!("[PROC] still kept");
        mute_targets(&[]);
        log::warn!(target: "noisy", "back");

        let out = CAPTURED.lock().unwrap();
        assert!(out.contains("DEBUG [PROC] created pid 3"));
        assert!(out.contains("WARN  [PROC] kept"));
        assert!(out.contains("WARN  [PROC] still kept"));
        assert!(out.contains("WARN  back"));
        assert!(!out.contains("hidden"));

        // A second install is refused
        assert!(init(LevelFilter::Trace, capture, false).is_err());
    }
}
