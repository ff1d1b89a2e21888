//! JSONL logger: append-only line-delimited JSON for machine-friendly log consumption.
//!
//! Each line is a self-contained JSON object. Lines are assembled in memory and
//! written with a single `write_all` so a concurrent `tail -f` never observes a
//! partial line.
//!
//! Four-level fallback chain:
//! 1. Primary file path
//! 2. Fallback path
//! 3. stderr with `[PURGE-JSONL]` prefix
//! 4. Silent discard (a purge run never fails because of logging)

#![allow(missing_docs)]

use std::fmt;
use std::fs::{self, File, OpenOptions, rename};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::{PurgeError, Result};

/// Severity level for log entries. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl Severity {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!(
                "unknown level {other:?}, expected debug, info, warning or error"
            )),
        }
    }
}

/// Per-file action recorded alongside a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    RunStart,
    RunComplete,
    Retained,
    Deleted,
    SimulatedDelete,
    DirectorySkipped,
    Error,
}

/// A single log entry. `ts`, `level`, `logger` and `message` are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// ISO 8601 UTC timestamp.
    pub ts: String,
    pub level: Severity,
    /// Dotted name of the component that produced the entry.
    pub logger: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<EventKind>,
    /// Affected filesystem path (when applicable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// PRG error code if the entry reports a failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl LogEntry {
    /// Create a new entry stamped with the current UTC time.
    pub fn new(level: Severity, logger: &str, message: impl Into<String>) -> Self {
        Self {
            ts: format_utc_now(),
            level,
            logger: logger.to_string(),
            message: message.into(),
            event: None,
            path: None,
            error_code: None,
        }
    }

    #[must_use]
    pub fn with_event(mut self, event: EventKind) -> Self {
        self.event = Some(event);
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: &Path) -> Self {
        self.path = Some(path.to_string_lossy().into_owned());
        self
    }

    #[must_use]
    pub fn with_error_code(mut self, code: &str) -> Self {
        self.error_code = Some(code.to_string());
        self
    }

    /// Human-readable single-line rendering: `<ts> <LEVEL> [<logger>] <message>`.
    #[must_use]
    pub fn to_console_line(&self) -> String {
        format!("{} {} [{}] {}", self.ts, self.level, self.logger, self.message)
    }
}

/// Degradation state of the JSONL writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    /// Writing to primary path.
    Normal,
    /// Primary failed, writing to fallback path.
    Fallback,
    /// Both files failed, writing to stderr.
    Stderr,
    /// Everything failed, silently discarding.
    Discard,
}

/// Configuration for the JSONL writer.
#[derive(Debug, Clone)]
pub struct JsonlConfig {
    /// Primary log file path.
    pub path: PathBuf,
    /// Optional fallback path (e.g. on a different filesystem).
    pub fallback_path: Option<PathBuf>,
    /// Maximum file size before rotation (bytes).
    pub max_size_bytes: u64,
    /// Number of rotated files to keep.
    pub max_rotated_files: u32,
}

impl Default for JsonlConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("purge.log"),
            fallback_path: None,
            max_size_bytes: 10 * 1024 * 1024,
            max_rotated_files: 3,
        }
    }
}

/// Append-only JSONL log writer with rotation and multi-level fallback.
pub struct JsonlWriter {
    config: JsonlConfig,
    file: Option<File>,
    state: WriterState,
    bytes_written: u64,
}

impl JsonlWriter {
    /// Open the JSONL log file. Falls through the degradation chain on failure.
    pub fn open(config: JsonlConfig) -> Self {
        let mut w = Self {
            config,
            file: None,
            state: WriterState::Discard,
            bytes_written: 0,
        };
        w.try_open_primary();
        w
    }

    /// Write a single log entry as one JSONL line.
    pub fn write_entry(&mut self, entry: &LogEntry) {
        let line = match serde_json::to_string(entry) {
            Ok(json) => format!("{json}\n"),
            Err(e) => {
                let _ = writeln!(io::stderr(), "[PURGE-JSONL] serialize error: {e}");
                return;
            }
        };

        self.write_line(&line);
    }

    /// Flush and sync the underlying file.
    pub fn flush(&mut self) {
        if let Some(f) = self.file.as_mut() {
            let _ = f.flush();
            let _ = f.sync_data();
        }
    }

    /// Current degradation state.
    pub fn state(&self) -> &str {
        match self.state {
            WriterState::Normal => "normal",
            WriterState::Fallback => "fallback",
            WriterState::Stderr => "stderr",
            WriterState::Discard => "discard",
        }
    }

    // ──────────────────────── internals ────────────────────────

    fn write_line(&mut self, line: &str) {
        if self.bytes_written + line.len() as u64 > self.config.max_size_bytes
            && self.bytes_written > 0
            && matches!(self.state, WriterState::Normal | WriterState::Fallback)
        {
            self.rotate();
        }

        match self.state {
            WriterState::Normal | WriterState::Fallback => {
                if let Some(f) = self.file.as_mut() {
                    if f.write_all(line.as_bytes()).is_err() {
                        self.degrade();
                        self.write_line(line); // retry at next level
                        return;
                    }
                    self.bytes_written += line.len() as u64;
                } else {
                    self.degrade();
                    self.write_line(line);
                }
            }
            WriterState::Stderr => {
                let _ = write!(io::stderr(), "[PURGE-JSONL] {line}");
            }
            WriterState::Discard => {}
        }
    }

    fn try_open_primary(&mut self) {
        match open_append(&self.config.path) {
            Ok((file, size)) => {
                self.file = Some(file);
                self.state = WriterState::Normal;
                self.bytes_written = size;
            }
            Err(_) => {
                self.try_open_fallback();
            }
        }
    }

    fn try_open_fallback(&mut self) {
        if let Some(fb) = &self.config.fallback_path {
            match open_append(fb) {
                Ok((file, size)) => {
                    let _ = writeln!(
                        io::stderr(),
                        "[PURGE-JSONL] primary path failed, using fallback: {}",
                        fb.display()
                    );
                    self.file = Some(file);
                    self.state = WriterState::Fallback;
                    self.bytes_written = size;
                }
                Err(_) => {
                    self.state = WriterState::Stderr;
                    let _ = writeln!(
                        io::stderr(),
                        "[PURGE-JSONL] both primary and fallback paths failed, using stderr"
                    );
                }
            }
        } else {
            self.state = WriterState::Stderr;
            let _ = writeln!(
                io::stderr(),
                "[PURGE-JSONL] cannot open {}, using stderr",
                self.config.path.display()
            );
        }
    }

    fn degrade(&mut self) {
        self.file = None;
        match self.state {
            WriterState::Normal => {
                self.try_open_fallback();
            }
            WriterState::Fallback => {
                self.state = WriterState::Stderr;
                let _ = writeln!(
                    io::stderr(),
                    "[PURGE-JSONL] fallback write failed, using stderr"
                );
            }
            WriterState::Stderr => {
                self.state = WriterState::Discard;
            }
            WriterState::Discard => {}
        }
    }

    fn rotate(&mut self) {
        if let Some(f) = self.file.as_mut() {
            let _ = f.flush();
        }
        self.file = None;

        let base = match self.state {
            WriterState::Normal => self.config.path.clone(),
            WriterState::Fallback => match &self.config.fallback_path {
                Some(p) => p.clone(),
                None => return,
            },
            _ => return,
        };

        // Shift existing rotations: .N-1→.N, …, .1→.2, current→.1
        for i in (1..self.config.max_rotated_files).rev() {
            let _ = rename(rotated_name(&base, i), rotated_name(&base, i + 1));
        }
        let _ = rename(&base, rotated_name(&base, 1));

        match open_append(&base) {
            Ok((file, _)) => {
                self.file = Some(file);
                self.bytes_written = 0;
            }
            Err(_) => {
                self.degrade();
            }
        }
    }
}

impl Drop for JsonlWriter {
    fn drop(&mut self) {
        self.flush();
    }
}

// ──────────────────────── helpers ────────────────────────

/// Open or create a file for appending. Returns `(File, current_size)`.
fn open_append(path: &Path) -> Result<(File, u64)> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| PurgeError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| PurgeError::io(path, source))?;
    let size = file.metadata().map(|m| m.len()).unwrap_or(0);
    Ok((file, size))
}

/// Build a rotated filename: `purge.log` → `purge.log.2`.
fn rotated_name(base: &Path, index: u32) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

/// Format current UTC time as ISO 8601.
fn format_utc_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

// ──────────────────────── tests ────────────────────────
