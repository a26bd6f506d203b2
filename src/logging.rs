use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use colored::Colorize;
use log::{Level, LevelFilter, Metadata, Record};

use crate::log_buffer;

static START: OnceLock<Instant> = OnceLock::new();

/// Logger that prints colored, timestamped lines to stderr and keeps a tail in memory.
/// stdout belongs to the panel and the headless report.
struct DashLogger;

impl log::Log for DashLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let elapsed = START.get_or_init(Instant::now).elapsed();
        let seconds = elapsed.as_secs();
        let millis = elapsed.subsec_millis();
        let ts_compact = if seconds < 60 {
            format!("{:>3}.{:03}s", seconds, millis)
        } else if seconds < 3600 {
            format!("{:>2}m{:02}s", seconds / 60, seconds % 60)
        } else {
            format!("{:>2}h{:02}m", seconds / 3600, (seconds % 3600) / 60)
        };
        let ts_ms = seconds.saturating_mul(1000) + millis as u64;

        let (level_str, level_char) = match record.level() {
            Level::Error => ("ERROR", 'E'),
            Level::Warn => ("WARN ", 'W'),
            Level::Info => ("INFO ", 'I'),
            Level::Debug => ("DEBUG", 'D'),
            Level::Trace => ("TRACE", 'T'),
        };
        let module = record
            .module_path()
            .unwrap_or("unknown")
            .rsplit("::")
            .next()
            .unwrap_or("unknown");
        let module_display = module.get(..12).unwrap_or(module);

        let message = record.args().to_string();
        let line = format!(
            "{} [{}] {:>12} | {}",
            ts_compact, level_char, module_display, message
        );
        let line = match record.level() {
            Level::Error => line.bright_red(),
            Level::Warn => line.bright_yellow(),
            Level::Info => line.bright_green(),
            Level::Debug => line.bright_blue(),
            Level::Trace => line.bright_black(),
        };

        // A closed stderr must never take the dashboard down
        let _ = writeln!(std::io::stderr().lock(), "{}", line);

        log_buffer::append(level_str, Some(module), &message, ts_ms);
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: DashLogger = DashLogger;

/// Install the logger at `level`, keeping the newest `buffer_lines` lines in memory
pub fn init_logger(level: &str, buffer_lines: usize) -> Result<(), log::SetLoggerError> {
    let _ = START.set(Instant::now());
    log_buffer::init(buffer_lines);
    log::set_logger(&LOGGER)?;
    if !set_max_level_from_str(level) {
        log::set_max_level(LevelFilter::Info);
        log::warn!("Unknown log level '{}', using info", level);
    }
    Ok(())
}

/// Apply settings that only become known once the config file is read.
/// `level` is skipped when `None` (an override from the command line wins).
pub fn reconfigure(level: Option<&str>, buffer_lines: usize) {
    if let Some(level) = level {
        if !set_max_level_from_str(level) {
            log::warn!("Unknown log level '{}' in config, keeping {}", level, log::max_level());
        }
    }
    if let Some(buffer) = log_buffer::global() {
        buffer.set_capacity(buffer_lines);
    }
}

pub fn parse_level(level: &str) -> Option<LevelFilter> {
    let lf = match level.to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" | "warning" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => return None,
    };
    Some(lf)
}

/// Parse and set log level from a string; returns true if applied
pub fn set_max_level_from_str(level: &str) -> bool {
    match parse_level(level) {
        Some(lf) => {
            log::set_max_level(lf);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Some(LevelFilter::Debug));
        assert_eq!(parse_level("warning"), Some(LevelFilter::Warn));
        assert_eq!(parse_level("off"), Some(LevelFilter::Off));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn test_second_install_is_an_error() {
        let _ = init_logger("info", 200);
        let err = init_logger("info", 200).map_err(anyhow::Error::from);
        let err = err.expect_err("logger already installed");
        assert!(err.to_string().contains("logger"));
    }
}
