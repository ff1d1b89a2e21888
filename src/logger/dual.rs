//! Dual-write activity logger: every entry goes to the JSONL file and is mirrored
//! as a human-readable line on stdout.
//!
//! Both sinks are written synchronously on the calling thread. The file sink
//! degrades on its own (see [`JsonlWriter`]); the console sink ignores write
//! errors so a closed stdout never aborts a run.

#![allow(missing_docs)]

use std::io::{self, IsTerminal, Write};

use colored::{ColoredString, Colorize};
use parking_lot::Mutex;

use crate::core::config::LoggingConfig;
use crate::logger::jsonl::{JsonlConfig, JsonlWriter, LogEntry, Severity};
use crate::logger::reporter::Reporter;

/// Options for building the dual-write logger.
#[derive(Debug, Clone)]
pub struct DualLoggerConfig {
    /// JSONL file sink. `None` disables the file.
    pub jsonl: Option<JsonlConfig>,
    /// Mirror entries to stdout.
    pub console: bool,
    /// Colorize the console mirror (only honored when stdout is a terminal).
    pub color: bool,
    /// Entries below this level are dropped by both sinks.
    pub min_level: Severity,
}

impl Default for DualLoggerConfig {
    fn default() -> Self {
        Self {
            jsonl: Some(JsonlConfig::default()),
            console: true,
            color: true,
            min_level: Severity::Debug,
        }
    }
}

impl From<&LoggingConfig> for DualLoggerConfig {
    fn from(cfg: &LoggingConfig) -> Self {
        Self {
            jsonl: Some(JsonlConfig {
                path: cfg.file.clone(),
                fallback_path: cfg.fallback_file.clone(),
                max_size_bytes: cfg.max_size_bytes,
                max_rotated_files: cfg.max_rotated_files,
            }),
            console: cfg.stdout,
            color: cfg.color,
            min_level: cfg.level,
        }
    }
}

/// File + console reporter constructed once per run and passed by reference.
pub struct ActivityLogger {
    jsonl: Option<Mutex<JsonlWriter>>,
    console: bool,
    color: bool,
    min_level: Severity,
}

impl ActivityLogger {
    /// Open the configured sinks. Never fails: an unusable file sink degrades.
    pub fn open(config: DualLoggerConfig) -> Self {
        Self {
            jsonl: config.jsonl.map(|c| Mutex::new(JsonlWriter::open(c))),
            console: config.console,
            color: config.color && io::stdout().is_terminal(),
            min_level: config.min_level,
        }
    }

    /// Degradation state of the file sink, if one is configured.
    pub fn file_state(&self) -> Option<String> {
        self.jsonl.as_ref().map(|w| w.lock().state().to_string())
    }

    /// Flush the file sink.
    pub fn flush(&self) {
        if let Some(w) = &self.jsonl {
            w.lock().flush();
        }
        let _ = io::stdout().flush();
    }

    fn write_console(&self, entry: &LogEntry) {
        let line = if self.color {
            format!(
                "{} {} [{}] {}",
                entry.ts.as_str().dimmed(),
                paint_level(entry.level),
                entry.logger,
                entry.message
            )
        } else {
            entry.to_console_line()
        };
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{line}");
    }
}

impl Reporter for ActivityLogger {
    fn record(&self, entry: LogEntry) {
        if entry.level < self.min_level {
            return;
        }
        if let Some(w) = &self.jsonl {
            w.lock().write_entry(&entry);
        }
        if self.console {
            self.write_console(&entry);
        }
    }
}

impl Drop for ActivityLogger {
    fn drop(&mut self) {
        self.flush();
    }
}

fn paint_level(level: Severity) -> ColoredString {
    match level {
        Severity::Debug => level.label().dimmed(),
        Severity::Info => level.label().green(),
        Severity::Warning => level.label().yellow(),
        Severity::Error => level.label().red().bold(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn file_only(path: std::path::PathBuf, min_level: Severity) -> DualLoggerConfig {
        DualLoggerConfig {
            jsonl: Some(JsonlConfig {
                path,
                ..JsonlConfig::default()
            }),
            console: false,
            color: false,
            min_level,
        }
    }

    #[test]
    fn writes_entries_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("purge.log");
        let logger = ActivityLogger::open(file_only(path.clone(), Severity::Debug));
        logger.record(LogEntry::new(Severity::Info, "purge::engine", "Deleting: /x"));
        logger.flush();

        let contents = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(contents.trim()).unwrap();
        assert_eq!(parsed["message"], "Deleting: /x");
        assert_eq!(logger.file_state().as_deref(), Some("normal"));
    }

    #[test]
    fn drops_entries_below_min_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("purge.log");
        let logger = ActivityLogger::open(file_only(path.clone(), Severity::Warning));
        logger.record(LogEntry::new(Severity::Info, "t", "skip me"));
        logger.record(LogEntry::new(Severity::Error, "t", "keep me"));
        logger.flush();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("skip me"));
        assert!(contents.contains("keep me"));
    }

    #[test]
    fn builds_from_logging_config() {
        let cfg = LoggingConfig {
            stdout: false,
            level: Severity::Error,
            ..LoggingConfig::default()
        };
        let dual = DualLoggerConfig::from(&cfg);
        assert!(!dual.console);
        assert_eq!(dual.min_level, Severity::Error);
        assert_eq!(dual.jsonl.unwrap().path, cfg.file);
    }

    #[test]
    fn no_file_sink_when_disabled() {
        let logger = ActivityLogger::open(DualLoggerConfig {
            jsonl: None,
            console: false,
            ..DualLoggerConfig::default()
        });
        logger.record(LogEntry::new(Severity::Info, "t", "nowhere"));
        assert!(logger.file_state().is_none());
    }
}
