//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{PurgeError, Result};
use crate::logger::jsonl::Severity;
use crate::scanner::purge::ErrorPolicy;

/// Full purge configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub purge: PurgeSettings,
    /// Path the configuration was loaded from (not read from the file).
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Log sinks: JSONL file plus console mirror on stdout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Primary JSONL log file. Relative paths resolve against the working directory.
    pub file: PathBuf,
    /// Secondary file used when the primary cannot be opened.
    pub fallback_file: Option<PathBuf>,
    /// Minimum severity written to either sink.
    pub level: Severity,
    /// Mirror log lines to stdout.
    pub stdout: bool,
    /// Colorize the stdout mirror when it is a terminal.
    pub color: bool,
    pub max_size_bytes: u64,
    pub max_rotated_files: u32,
}

/// Engine behavior knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct PurgeSettings {
    pub error_policy: ErrorPolicy,
    pub follow_symlinks: bool,
    /// Maximum recursion depth below the root. `None` = unbounded.
    pub max_depth: Option<usize>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("purge.log"),
            fallback_file: None,
            level: Severity::Debug,
            stdout: true,
            color: true,
            max_size_bytes: 10 * 1024 * 1024,
            max_rotated_files: 3,
        }
    }
}

impl Config {
    /// Default configuration path: `$HOME/.config/purge/config.toml`.
    #[must_use]
    pub fn default_path() -> PathBuf {
        let home_dir = env::var_os("HOME").map_or_else(|| PathBuf::from("/tmp"), PathBuf::from);
        home_dir.join(".config").join("purge").join("config.toml")
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, env_var)
    }

    /// [`Config::load`] with an injectable environment lookup.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| PurgeError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let mut parsed = Self::from_toml(&raw)?;
            parsed.source = Some(path_buf);
            parsed
        } else if is_explicit_path {
            return Err(PurgeError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.apply_env_overrides_from(lookup)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a TOML document without touching the environment.
    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("PURGE_LOG_FILE") {
            self.logging.file = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("PURGE_LOG_LEVEL") {
            self.logging.level = raw.parse().map_err(|details| PurgeError::ConfigParse {
                context: "env",
                details: format!("PURGE_LOG_LEVEL={raw:?}: {details}"),
            })?;
        }
        if let Some(raw) = lookup("PURGE_LOG_STDOUT") {
            self.logging.stdout = parse_env_bool("PURGE_LOG_STDOUT", &raw)?;
        }
        if let Some(raw) = lookup("PURGE_ERROR_POLICY") {
            self.purge.error_policy = raw.parse().map_err(|details| PurgeError::ConfigParse {
                context: "env",
                details: format!("PURGE_ERROR_POLICY={raw:?}: {details}"),
            })?;
        }
        if let Some(raw) = lookup("PURGE_FOLLOW_SYMLINKS") {
            self.purge.follow_symlinks = parse_env_bool("PURGE_FOLLOW_SYMLINKS", &raw)?;
        }
        if let Some(raw) = lookup("PURGE_MAX_DEPTH") {
            self.purge.max_depth = Some(parse_env_usize("PURGE_MAX_DEPTH", &raw)?);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.logging.file.as_os_str().is_empty() {
            return Err(PurgeError::InvalidConfig {
                details: "logging.file must not be empty".to_string(),
            });
        }
        if self.logging.max_size_bytes == 0 {
            return Err(PurgeError::InvalidConfig {
                details: "logging.max_size_bytes must be > 0".to_string(),
            });
        }
        if self.logging.max_rotated_files == 0 {
            return Err(PurgeError::InvalidConfig {
                details: "logging.max_rotated_files must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env_usize(name: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse::<usize>()
        .map_err(|error| PurgeError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}

fn parse_env_bool(name: &str, raw: &str) -> Result<bool> {
    raw.trim()
        .parse::<bool>()
        .map_err(|error| PurgeError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}
