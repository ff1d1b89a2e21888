//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use purge::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{PurgeError, Result};
pub use crate::core::time_span::{Cutoff, TimeSpan, TimeUnit};

// Logger
pub use crate::logger::dual::{ActivityLogger, DualLoggerConfig};
pub use crate::logger::jsonl::{EventKind, LogEntry, Severity};
pub use crate::logger::reporter::{MemoryReporter, NullReporter, Reporter};

// Scanner
pub use crate::scanner::patterns::NamePattern;
pub use crate::scanner::purge::{
    ErrorPolicy, Outcome, PurgeConfig, PurgeEngine, PurgeReport, purge,
};
pub use crate::scanner::walker::{DirectoryWalker, WalkerConfig};
