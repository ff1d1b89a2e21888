//! The `Reporter` seam: everything that emits log entries takes one by reference
//! instead of reaching for a process-global logger.

use parking_lot::Mutex;

use crate::logger::jsonl::{EventKind, LogEntry, Severity};

/// Sink for structured log entries.
pub trait Reporter {
    /// Record one entry. Must not fail; sinks degrade internally.
    fn record(&self, entry: LogEntry);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn record(&self, _entry: LogEntry) {}
}

/// Keeps entries in memory; used by tests and library callers that want to
/// inspect what a run reported.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// Entries tagged with the given event.
    #[must_use]
    pub fn events(&self, kind: EventKind) -> Vec<LogEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.event == Some(kind))
            .cloned()
            .collect()
    }

    /// Messages at or above `level`.
    #[must_use]
    pub fn messages_at(&self, level: Severity) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.level >= level)
            .map(|e| e.message.clone())
            .collect()
    }
}

impl Reporter for MemoryReporter {
    fn record(&self, entry: LogEntry) {
        self.entries.lock().push(entry);
    }
}
