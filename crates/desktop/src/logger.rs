//! Ring buffer of log lines shown on the Settings page.

use std::collections::VecDeque;
use std::sync::{Mutex, OnceLock};

const LOG_BUFFER_MAX_LINES: usize = 2000;

static LOG_LINES: OnceLock<Mutex<VecDeque<String>>> = OnceLock::new();

fn log_buffer() -> &'static Mutex<VecDeque<String>> {
    LOG_LINES.get_or_init(|| Mutex::new(VecDeque::new()))
}

fn push_log_line(line: String) {
    if let Ok(mut buf) = log_buffer().lock() {
        buf.push_back(line);
        while buf.len() > LOG_BUFFER_MAX_LINES {
            buf.pop_front();
        }
    }
}

/// Snapshot of the buffered lines, oldest first.
pub fn lines() -> Vec<String> {
    log_buffer()
        .lock()
        .map(|b| b.iter().cloned().collect())
        .unwrap_or_default()
}

/// Logger that appends `HH:MM:SS.mmm [LEVEL] message` lines to the buffer.
struct DesktopLogger;

impl log::Log for DesktopLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        // matrix-sdk and its dependencies are chatty at debug level
        metadata.level() <= log::Level::Info || metadata.target().starts_with("lib")
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        push_log_line(format!(
            "{} [{}] {}",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            record.args()
        ));
    }

    fn flush(&self) {}
}

static LOGGER: DesktopLogger = DesktopLogger;

pub fn init() {
    let _ = log_buffer();
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(log::LevelFilter::Debug);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_keeps_newest_lines() {
        for i in 0..(LOG_BUFFER_MAX_LINES + 5) {
            push_log_line(format!("line {}", i));
        }
        let lines = lines();
        assert_eq!(lines.len(), LOG_BUFFER_MAX_LINES);
        assert_eq!(lines.last().map(String::as_str), Some("line 2004"));
    }
}
