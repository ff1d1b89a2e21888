//! Purge engine: walk a tree, select files by base-name pattern and age, and
//! delete them (or report what would be deleted).
//!
//! Pipeline per run: parse span -> fix cutoff -> walk -> for each file:
//! match name -> stat -> age check -> act.
//!
//! The cutoff is computed exactly once. A file is eligible only if its name
//! matches and its modification time is strictly earlier than the cutoff.
//! Per-file failures are either fatal for the run ([`ErrorPolicy::Abort`]) or
//! collected while the walk continues ([`ErrorPolicy::Continue`]).

#![allow(missing_docs)]

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant, SystemTime};

use serde::{Deserialize, Serialize};

use crate::core::config::PurgeSettings;
use crate::core::errors::{FileOp, PurgeError, Result};
use crate::core::time_span::{Cutoff, TimeSpan};
use crate::logger::jsonl::{EventKind, LogEntry, Severity};
use crate::logger::reporter::Reporter;
use crate::scanner::patterns::NamePattern;
use crate::scanner::walker::{DirectoryWalker, WalkEntry, WalkEvent, WalkerConfig};

/// Logger name used for every entry the engine emits.
pub const LOGGER: &str = "purge::engine";

// ──────────────────── configuration ────────────────────

/// What to do when a single file cannot be inspected or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop at the first per-file failure.
    #[default]
    Abort,
    /// Record the failure and keep walking.
    Continue,
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abort => f.write_str("abort"),
            Self::Continue => f.write_str("continue"),
        }
    }
}

impl FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" | "fail-fast" => Ok(Self::Abort),
            "continue" | "keep-going" => Ok(Self::Continue),
            other => Err(format!(
                "unknown error policy {other:?}, expected abort or continue"
            )),
        }
    }
}

/// Configuration for one engine run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeConfig {
    /// Report intended deletions without touching the filesystem.
    pub simulate: bool,
    pub error_policy: ErrorPolicy,
    pub follow_symlinks: bool,
    pub max_depth: Option<usize>,
}

impl Default for PurgeConfig {
    fn default() -> Self {
        Self {
            simulate: true,
            error_policy: ErrorPolicy::Abort,
            follow_symlinks: false,
            max_depth: None,
        }
    }
}

impl PurgeConfig {
    /// Engine config from file/env settings plus the run mode.
    #[must_use]
    pub fn from_settings(settings: &PurgeSettings, simulate: bool) -> Self {
        Self {
            simulate,
            error_policy: settings.error_policy,
            follow_symlinks: settings.follow_symlinks,
            max_depth: settings.max_depth,
        }
    }
}

// ──────────────────── report types ────────────────────

/// Decision taken for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Name did not match the pattern.
    Skipped,
    /// Name matched but the file is not older than the cutoff.
    Retained,
    Deleted,
    SimulatedDelete,
}

/// One evaluated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub outcome: Outcome,
    /// Modification time, when the file was stat'ed.
    pub modified: Option<SystemTime>,
    /// The path is a symlink; deletion removes the link, not its target.
    pub via_symlink: bool,
}

/// Everything a run produced: per-file outcomes in walk order plus failures.
#[derive(Debug)]
pub struct PurgeReport {
    pub simulate: bool,
    pub cutoff: Cutoff,
    pub outcomes: Vec<FileOutcome>,
    pub errors: Vec<PurgeError>,
    /// The run stopped early because of [`ErrorPolicy::Abort`].
    pub aborted: bool,
    pub skipped_dirs: usize,
    pub duration: Duration,
}

impl PurgeReport {
    fn new(simulate: bool, cutoff: Cutoff) -> Self {
        Self {
            simulate,
            cutoff,
            outcomes: Vec::new(),
            errors: Vec::new(),
            aborted: false,
            skipped_dirs: 0,
            duration: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.iter().filter(|o| o.outcome == outcome).count()
    }

    /// Paths deleted or (in simulation) selected for deletion, in walk order.
    pub fn acted_on(&self) -> impl Iterator<Item = &Path> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Deleted | Outcome::SimulatedDelete))
            .map(|o| o.path.as_path())
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Surface the first per-file failure as an error.
    pub fn into_result(mut self) -> Result<Self> {
        if self.errors.is_empty() {
            Ok(self)
        } else {
            Err(self.errors.swap_remove(0))
        }
    }

    /// One-line summary for the completion log entry.
    #[must_use]
    pub fn summary(&self) -> String {
        let acted = if self.simulate {
            format!("{} would be deleted", self.count(Outcome::SimulatedDelete))
        } else {
            format!("{} deleted", self.count(Outcome::Deleted))
        };
        format!(
            "{} files examined, {} matched, {acted}, {} retained, {} errors, {} directories skipped in {:.3}s",
            self.outcomes.len(),
            self.outcomes.len() - self.count(Outcome::Skipped),
            self.count(Outcome::Retained),
            self.errors.len(),
            self.skipped_dirs,
            self.duration.as_secs_f64()
        )
    }
}

// ──────────────────── engine ────────────────────

/// Runs purges against an injected reporter.
pub struct PurgeEngine<'r> {
    config: PurgeConfig,
    reporter: &'r dyn Reporter,
}

impl<'r> PurgeEngine<'r> {
    pub fn new(config: PurgeConfig, reporter: &'r dyn Reporter) -> Self {
        Self { config, reporter }
    }

    #[must_use]
    pub fn config(&self) -> &PurgeConfig {
        &self.config
    }

    /// Purge `root` relative to the current wall clock.
    pub fn run(&self, root: &Path, pattern: &NamePattern, span: &TimeSpan) -> PurgeReport {
        self.run_at(root, pattern, span, SystemTime::now())
    }

    /// Purge `root` with the cutoff computed from `now`.
    pub fn run_at(
        &self,
        root: &Path,
        pattern: &NamePattern,
        span: &TimeSpan,
        now: SystemTime,
    ) -> PurgeReport {
        let start = Instant::now();
        let cutoff = span.cutoff_from(now);
        let mut report = PurgeReport::new(self.config.simulate, cutoff);

        self.log(
            LogEntry::new(
                Severity::Debug,
                LOGGER,
                format!(
                    "Scanning {} for files matching {:?} older than {span} (cutoff {})",
                    root.display(),
                    pattern.as_str(),
                    cutoff.to_rfc3339()
                ),
            )
            .with_event(EventKind::RunStart)
            .with_path(root),
        );

        let walker = DirectoryWalker::new(WalkerConfig {
            root: root.to_path_buf(),
            max_depth: self.config.max_depth,
            follow_symlinks: self.config.follow_symlinks,
        });

        for event in &walker {
            match event {
                WalkEvent::File(entry) => match self.evaluate(&entry, pattern, &cutoff) {
                    Ok(outcome) => report.outcomes.push(outcome),
                    Err(err) => {
                        self.log_failure(&entry.path, &err);
                        report.errors.push(err);
                        if self.config.error_policy == ErrorPolicy::Abort {
                            report.aborted = true;
                            break;
                        }
                    }
                },
                WalkEvent::SkippedDir { path, source } => {
                    report.skipped_dirs += 1;
                    self.log(
                        LogEntry::new(
                            Severity::Warning,
                            LOGGER,
                            format!("Skipping unreadable directory {}: {source}", path.display()),
                        )
                        .with_event(EventKind::DirectorySkipped)
                        .with_path(&path),
                    );
                }
            }
        }

        report.duration = start.elapsed();
        self.log(
            LogEntry::new(Severity::Debug, LOGGER, report.summary())
                .with_event(EventKind::RunComplete),
        );
        report
    }

    fn evaluate(
        &self,
        entry: &WalkEntry,
        pattern: &NamePattern,
        cutoff: &Cutoff,
    ) -> Result<FileOutcome> {
        let path = &entry.path;
        let outcome = |outcome, modified| FileOutcome {
            path: path.clone(),
            outcome,
            modified,
            via_symlink: entry.via_symlink,
        };
        if !pattern.matches_path(path) {
            return Ok(outcome(Outcome::Skipped, None));
        }

        let modified = fs::metadata(path)
            .and_then(|meta| meta.modified())
            .map_err(|source| PurgeError::file_op(path, FileOp::Stat, source))?;

        if !cutoff.is_expired(modified) {
            self.log(
                LogEntry::new(
                    Severity::Debug,
                    LOGGER,
                    format!("Retaining: {}", describe(entry)),
                )
                .with_event(EventKind::Retained)
                .with_path(path),
            );
            return Ok(outcome(Outcome::Retained, Some(modified)));
        }

        if self.config.simulate {
            self.log(
                LogEntry::new(
                    Severity::Info,
                    LOGGER,
                    format!("[DRY RUN] Would delete: {}", describe(entry)),
                )
                .with_event(EventKind::SimulatedDelete)
                .with_path(path),
            );
            return Ok(outcome(Outcome::SimulatedDelete, Some(modified)));
        }

        fs::remove_file(path).map_err(|source| PurgeError::file_op(path, FileOp::Remove, source))?;
        self.log(
            LogEntry::new(Severity::Info, LOGGER, format!("Deleted: {}", describe(entry)))
                .with_event(EventKind::Deleted)
                .with_path(path),
        );
        Ok(outcome(Outcome::Deleted, Some(modified)))
    }

    // ──────────────────── logging helpers ────────────────────

    fn log(&self, entry: LogEntry) {
        self.reporter.record(entry);
    }

    fn log_failure(&self, path: &Path, err: &PurgeError) {
        let cause = std::error::Error::source(err)
            .map_or_else(|| err.to_string(), ToString::to_string);
        self.log(
            LogEntry::new(
                Severity::Error,
                LOGGER,
                format!("Error processing file {}: {cause}", path.display()),
            )
            .with_event(EventKind::Error)
            .with_path(path)
            .with_error_code(err.code()),
        );
    }
}

fn describe(entry: &WalkEntry) -> String {
    if entry.via_symlink {
        format!("{} (symlink)", entry.path.display())
    } else {
        entry.path.display().to_string()
    }
}

/// Parse the inputs, run once with [`ErrorPolicy::Abort`], and propagate the
/// first per-file failure.
///
/// Input validation happens before any traversal, so an invalid time span or
/// pattern leaves the filesystem untouched.
pub fn purge(
    directory: impl AsRef<Path>,
    pattern: &str,
    time_span: &str,
    simulate: bool,
    reporter: &dyn Reporter,
) -> Result<PurgeReport> {
    let span = TimeSpan::parse(time_span)?;
    let pattern = NamePattern::new(pattern)?;
    let engine = PurgeEngine::new(
        PurgeConfig {
            simulate,
            ..PurgeConfig::default()
        },
        reporter,
    );
    engine.run(directory.as_ref(), &pattern, &span).into_result()
}

// ──────────────────── tests ────────────────────
