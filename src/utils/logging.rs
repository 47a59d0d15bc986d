// Mon Feb 02 2026 - Alex

use colored::*;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::atomic::{AtomicBool, Ordering};

pub struct LoggingUtils;

impl LoggingUtils {
    pub fn init_logger(level: LevelFilter) {
        let logger = Box::new(ColoredLogger::new(level, atty::is(atty::Stream::Stderr)));
        log::set_boxed_logger(logger).ok();
        log::set_max_level(level);
    }

    pub fn level_from_verbosity(verbosity: usize) -> LevelFilter {
        match verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

struct ColoredLogger {
    level: LevelFilter,
    use_color: AtomicBool,
}

impl ColoredLogger {
    fn new(level: LevelFilter, use_color: bool) -> Self {
        Self {
            level,
            use_color: AtomicBool::new(use_color),
        }
    }

    fn format_level(&self, level: Level) -> ColoredString {
        match level {
            Level::Error => "ERROR".red().bold(),
            Level::Warn => "WARN ".yellow().bold(),
            Level::Info => "INFO ".green().bold(),
            Level::Debug => "DEBUG".blue().bold(),
            Level::Trace => "TRACE".magenta().bold(),
        }
    }
}

impl Log for ColoredLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let level_str = if self.use_color.load(Ordering::Relaxed) {
                self.format_level(record.level()).to_string()
            } else {
                format!("{:5}", record.level())
            };

            let target = if !record.target().is_empty() {
                format!("[{}]", record.target())
            } else {
                String::new()
            };

            eprintln!("{} {} {}", level_str, target.dimmed(), record.args());
        }
    }

    fn flush(&self) {}
}

pub struct ScopedTimer {
    name: String,
    start: std::time::Instant,
}

impl ScopedTimer {
    pub fn new(name: &str) -> Self {
        log::debug!("[TIMER] {} started", name);
        Self {
            name: name.to_string(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        log::debug!("[TIMER] {} took {:.2}ms", self.name, elapsed.as_secs_f64() * 1000.0);
    }
}

pub fn init_logger(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    LoggingUtils::init_logger(level);
}

/// Honor RUST_LOG when set, otherwise fall back to the colored logger.
pub fn init_from_env(verbose: bool) {
    if std::env::var_os("RUST_LOG").is_some() {
        env_logger::init();
    } else {
        init_logger(verbose);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_verbosity() {
        assert_eq!(LoggingUtils::level_from_verbosity(0), LevelFilter::Warn);
        assert_eq!(LoggingUtils::level_from_verbosity(1), LevelFilter::Info);
        assert_eq!(LoggingUtils::level_from_verbosity(2), LevelFilter::Debug);
        assert_eq!(LoggingUtils::level_from_verbosity(9), LevelFilter::Trace);
    }
}
