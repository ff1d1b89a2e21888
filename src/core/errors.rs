//! PRG-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, PurgeError>;

/// Filesystem operation that failed for a single candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOp {
    Stat,
    Remove,
}

impl fmt::Display for FileOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stat => f.write_str("stat"),
            Self::Remove => f.write_str("remove"),
        }
    }
}

/// Top-level error type for purge.
#[derive(Debug, Error)]
pub enum PurgeError {
    #[error("[PRG-1001] invalid time span {input:?}: {reason}")]
    InvalidTimeSpan { input: String, reason: String },

    #[error("[PRG-1002] invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("[PRG-1101] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[PRG-1102] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[PRG-1103] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[PRG-2001] {op} failed for {path}: {source}")]
    FileOperation {
        path: PathBuf,
        op: FileOp,
        #[source]
        source: std::io::Error,
    },

    #[error("[PRG-2002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PurgeError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidTimeSpan { .. } => "PRG-1001",
            Self::Pattern { .. } => "PRG-1002",
            Self::InvalidConfig { .. } => "PRG-1101",
            Self::MissingConfig { .. } => "PRG-1102",
            Self::ConfigParse { .. } => "PRG-1103",
            Self::FileOperation { .. } => "PRG-2001",
            Self::Io { .. } => "PRG-2002",
        }
    }

    /// Whether the failure was detected while validating input, before any
    /// filesystem traversal took place.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidTimeSpan { .. }
                | Self::Pattern { .. }
                | Self::InvalidConfig { .. }
                | Self::MissingConfig { .. }
                | Self::ConfigParse { .. }
        )
    }

    /// Path the failure is attached to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::FileOperation { path, .. }
            | Self::Io { path, .. }
            | Self::MissingConfig { path } => Some(path),
            _ => None,
        }
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for a per-file failure.
    #[must_use]
    pub fn file_op(path: impl AsRef<Path>, op: FileOp, source: std::io::Error) -> Self {
        Self::FileOperation {
            path: path.as_ref().to_path_buf(),
            op,
            source,
        }
    }
}

impl From<toml::de::Error> for PurgeError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
