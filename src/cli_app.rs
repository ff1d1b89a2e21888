//! Command-line definition and run orchestration.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use colored::control;
use thiserror::Error;

use purge::core::config::Config;
use purge::core::errors::PurgeError;
use purge::core::time_span::TimeSpan;
use purge::logger::dual::{ActivityLogger, DualLoggerConfig};
use purge::logger::jsonl::{LogEntry, Severity};
use purge::logger::reporter::Reporter;
use purge::scanner::patterns::NamePattern;
use purge::scanner::purge::{ErrorPolicy, PurgeConfig, PurgeEngine, PurgeReport};

const LOGGER: &str = "purge::cli";

/// Delete files older than a time span whose names match a pattern.
///
/// Without `--no-dry-run` nothing is deleted; eligible files are only logged.
#[derive(Debug, Parser)]
#[command(
    name = "purge",
    version,
    about = "Recursively purge files by name pattern and age",
    long_about = None,
    disable_version_flag = true
)]
pub struct Cli {
    /// Root directory to scan recursively.
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,
    /// Regex matched against the start of each file's base name.
    #[arg(short = 'r', long = "regex", value_name = "PATTERN")]
    regex: String,
    /// Age threshold: a non-negative integer followed by D, W, M or Y (e.g. 3D, 2W).
    #[arg(short, long, value_name = "SPAN")]
    time_span: String,
    /// Actually delete files. Without this flag the run is simulated.
    #[arg(long)]
    no_dry_run: bool,
    /// Override config file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Override the JSONL log file path.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
    /// Record per-file failures and continue instead of stopping at the first.
    #[arg(long)]
    keep_going: bool,
    /// Descend into symlinked directories. Symlinked files are always candidates.
    #[arg(long)]
    follow_symlinks: bool,
    /// Maximum directory depth below the root (0 = root's own files only).
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,
    /// Disable colored output.
    #[arg(long)]
    no_color: bool,
    /// Print version.
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,
}

impl Cli {
    const fn simulate(&self) -> bool {
        !self.no_dry_run
    }

    /// Flags win over file and environment settings.
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(path) = &self.log_file {
            config.logging.file.clone_from(path);
        }
        if self.keep_going {
            config.purge.error_policy = ErrorPolicy::Continue;
        }
        if self.follow_symlinks {
            config.purge.follow_symlinks = true;
        }
        if let Some(depth) = self.max_depth {
            config.purge.max_depth = Some(depth);
        }
        if self.no_color {
            config.logging.color = false;
        }
    }
}

/// Top-level CLI error.
#[derive(Debug, Error)]
pub enum CliError {
    /// Input validation, configuration, or the first fatal per-file failure.
    #[error(transparent)]
    Purge(#[from] PurgeError),
    /// The run finished under the continue policy but some files failed.
    #[error("{count} file(s) could not be processed; first failure: {first}")]
    Partial { count: usize, first: PurgeError },
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Purge(_) | Self::Partial { .. } => 1,
        }
    }

    /// The underlying failure (the first one for partial runs).
    const fn purge_error(&self) -> &PurgeError {
        match self {
            Self::Purge(e) | Self::Partial { first: e, .. } => e,
        }
    }
}

/// Load configuration, open the activity log, and run one purge.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    let logger = ActivityLogger::open(DualLoggerConfig::from(&config.logging));
    if let Some(source) = &config.source {
        logger.record(LogEntry::new(
            Severity::Debug,
            LOGGER,
            format!("Loaded configuration from {}", source.display()),
        ));
    }
    if let Some(state) = logger.file_state()
        && state != "normal"
    {
        logger.record(LogEntry::new(
            Severity::Warning,
            LOGGER,
            format!("Log file unavailable, activity log degraded to {state}"),
        ));
    }

    let result = execute(cli, &config, &logger);
    match &result {
        Ok(report) => logger.record(LogEntry::new(
            Severity::Info,
            LOGGER,
            format!("Purge completed successfully. {}", report.summary()),
        )),
        Err(err) => logger.record(error_entry(err)),
    }
    logger.flush();
    result.map(|_| ())
}

fn error_entry(err: &CliError) -> LogEntry {
    let cause = err.purge_error();
    let entry = LogEntry::new(Severity::Error, LOGGER, format!("An error occurred: {err}"))
        .with_error_code(cause.code());
    match cause.path() {
        Some(path) => entry.with_path(path),
        None => entry,
    }
}

fn execute(cli: &Cli, config: &Config, logger: &ActivityLogger) -> Result<PurgeReport, CliError> {
    let simulate = cli.simulate();
    let mode = if simulate {
        "Dry run mode. No files will be deleted."
    } else {
        "Real deletion mode activated."
    };
    logger.record(LogEntry::new(Severity::Info, LOGGER, mode));

    let span = TimeSpan::parse(&cli.time_span)?;
    let pattern = NamePattern::new(&cli.regex)?;

    let engine = PurgeEngine::new(PurgeConfig::from_settings(&config.purge, simulate), logger);
    let mut report = engine.run(&cli.directory, &pattern, &span);

    if report.errors.is_empty() {
        return Ok(report);
    }
    let count = report.errors.len();
    let first = report.errors.swap_remove(0);
    if report.aborted {
        Err(CliError::Purge(first))
    } else {
        Err(CliError::Partial { count, first })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("purge").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn simulation_is_the_default() {
        let cli = parse(&["-d", "/tmp", "-r", "x", "-t", "3D"]);
        assert!(cli.simulate());
        let cli = parse(&["-d", "/tmp", "-r", "x", "-t", "3D", "--no-dry-run"]);
        assert!(!cli.simulate());
    }

    #[test]
    fn required_flags_are_enforced() {
        assert!(Cli::try_parse_from(["purge", "-d", "/tmp", "-r", "x"]).is_err());
    }

    #[test]
    fn short_v_prints_version() {
        let err = Cli::try_parse_from(["purge", "-v"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn flags_override_config() {
        let cli = parse(&[
            "-d",
            "/tmp",
            "-r",
            "x",
            "-t",
            "1W",
            "--log-file",
            "/tmp/custom.log",
            "--keep-going",
            "--follow-symlinks",
            "--max-depth",
            "2",
            "--no-color",
        ]);
        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.logging.file, PathBuf::from("/tmp/custom.log"));
        assert_eq!(config.purge.error_policy, ErrorPolicy::Continue);
        assert!(config.purge.follow_symlinks);
        assert_eq!(config.purge.max_depth, Some(2));
        assert!(!config.logging.color);
    }

    #[test]
    fn absent_flags_keep_config() {
        let cli = parse(&["-d", "/tmp", "-r", "x", "-t", "1W"]);
        let mut config = Config::default();
        config.purge.max_depth = Some(7);
        cli.apply_overrides(&mut config);
        assert_eq!(config.purge.max_depth, Some(7));
        assert_eq!(config.purge.error_policy, ErrorPolicy::Abort);
    }

    #[test]
    fn error_entry_carries_code_and_path() {
        let err = CliError::Partial {
            count: 3,
            first: PurgeError::file_op(
                "/data/old.log",
                purge::core::errors::FileOp::Remove,
                std::io::Error::other("busy"),
            ),
        };
        let entry = error_entry(&err);
        assert_eq!(entry.level, Severity::Error);
        assert_eq!(entry.error_code.as_deref(), Some("PRG-2001"));
        assert_eq!(entry.path.as_deref(), Some("/data/old.log"));
        assert!(entry.message.starts_with("An error occurred: 3 file(s)"));

        let input = error_entry(&CliError::from(PurgeError::InvalidTimeSpan {
            input: "1X".to_string(),
            reason: "unknown unit".to_string(),
        }));
        assert_eq!(input.error_code.as_deref(), Some("PRG-1001"));
        assert!(input.path.is_none());
    }

    #[test]
    fn every_failure_exits_one() {
        let err = CliError::from(PurgeError::InvalidConfig {
            details: "x".to_string(),
        });
        assert_eq!(err.exit_code(), 1);
        let partial = CliError::Partial {
            count: 2,
            first: PurgeError::MissingConfig {
                path: PathBuf::from("/x"),
            },
        };
        assert_eq!(partial.exit_code(), 1);
        assert!(partial.to_string().starts_with("2 file(s)"));
    }
}
