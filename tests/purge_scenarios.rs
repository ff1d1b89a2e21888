//! Library-level purge scenarios against real wall-clock ages.

mod common;

use std::fs;
use std::time::SystemTime;

use filetime::{FileTime, set_file_mtime};
use proptest::prelude::*;
use purge::prelude::{
    EventKind, MemoryReporter, NamePattern, NullReporter, Outcome, PurgeConfig, PurgeEngine,
    TimeSpan, purge,
};
use tempfile::TempDir;

#[test]
fn five_files_three_day_span() {
    let tmp = TempDir::new().unwrap();
    let files = common::aged_files(tmp.path(), 5);

    let reporter = MemoryReporter::new();
    let dry = purge(tmp.path(), r"file\d.txt", "3D", true, &reporter).unwrap();
    assert!(files.iter().all(|f| f.exists()));
    assert_eq!(dry.count(Outcome::SimulatedDelete), 3);
    assert_eq!(reporter.events(EventKind::SimulatedDelete).len(), 3);

    let real = purge(tmp.path(), r"file\d.txt", "3D", false, &NullReporter).unwrap();
    assert_eq!(real.count(Outcome::Deleted), 3);
    assert!(files[0].exists());
    assert!(files[1].exists());
    assert!(!files[2].exists());
    assert!(!files[3].exists());
    assert!(!files[4].exists());
}

#[test]
fn invalid_unit_leaves_tree_untouched() {
    let tmp = TempDir::new().unwrap();
    let files = common::aged_files(tmp.path(), 5);
    let err = purge(tmp.path(), r"file\d.txt", "1X", false, &NullReporter).unwrap_err();
    assert!(err.is_input_error());
    assert!(files.iter().all(|f| f.exists()));
}

#[test]
fn week_span_spares_recent_files() {
    let tmp = TempDir::new().unwrap();
    let files = common::aged_files(tmp.path(), 9);
    purge(tmp.path(), "file", "1W", false, &NullReporter).unwrap();
    let survivors: Vec<bool> = files.iter().map(|f| f.exists()).collect();
    assert_eq!(
        survivors,
        [true, true, true, true, true, true, false, false, false]
    );
}

#[test]
fn engine_respects_max_depth() {
    let tmp = TempDir::new().unwrap();
    let old = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(86_400);
    let top = tmp.path().join("top.tmp");
    let nested = tmp.path().join("nested/deep.tmp");
    fs::create_dir_all(nested.parent().unwrap()).unwrap();
    for path in [&top, &nested] {
        fs::write(path, "x").unwrap();
        set_file_mtime(path, FileTime::from_system_time(old)).unwrap();
    }

    let engine = PurgeEngine::new(
        PurgeConfig {
            simulate: false,
            max_depth: Some(0),
            ..PurgeConfig::default()
        },
        &NullReporter,
    );
    let report = engine.run(
        tmp.path(),
        &NamePattern::new(".*").unwrap(),
        &TimeSpan::parse("1D").unwrap(),
    );
    assert!(report.is_success());
    assert!(!top.exists());
    assert!(nested.exists());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn non_matching_names_survive_any_span(value in 1u64..500, unit in 0usize..4) {
        let tmp = TempDir::new().unwrap();
        let keep = tmp.path().join("keep.dat");
        fs::write(&keep, "x").unwrap();
        set_file_mtime(&keep, FileTime::from_unix_time(0, 0)).unwrap();

        let span = format!("{value}{}", ["D", "W", "M", "Y"][unit]);
        purge(tmp.path(), "drop", &span, false, &NullReporter).unwrap();
        prop_assert!(keep.exists());
    }
}
