#![forbid(unsafe_code)]

//! purge: recursively delete files whose base name matches a pattern and whose
//! modification time is older than a relative time span.
//!
//! Runs are simulated by default: eligible files are reported but left alone
//! until the caller asks for real deletion.
//!
//! # Library usage
//!
//! ```rust,no_run
//! use purge::prelude::*;
//!
//! let reporter = MemoryReporter::new();
//! let report = purge("/var/tmp/builds", r"build-\d+", "2W", true, &reporter)?;
//! println!("{}", report.summary());
//! # Ok::<(), PurgeError>(())
//! ```
//!
//! For control over error policy, symlinks or depth, build a
//! [`scanner::purge::PurgeEngine`] directly.

pub mod prelude;

pub mod core;
pub mod logger;
pub mod scanner;
