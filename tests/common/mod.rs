use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use filetime::{FileTime, set_file_mtime};

pub const DAY: Duration = Duration::from_secs(86_400);

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn resolve_bin_path() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_purge") {
        return PathBuf::from(path);
    }

    let exe_name = if cfg!(windows) { "purge.exe" } else { "purge" };
    let fallback = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .and_then(|deps| deps.parent().map(PathBuf::from))
        .map(|debug_dir| debug_dir.join(exe_name));

    match fallback {
        Some(path) if path.exists() => path,
        _ => panic!("unable to resolve purge binary path for integration test"),
    }
}

/// Run the binary inside `workdir` with a clean environment: `HOME` points at
/// `workdir` so no user config is picked up, and `PURGE_*` overrides are cleared.
pub fn run_cli_case(case_name: &str, workdir: &Path, args: &[&str]) -> CmdResult {
    let root = std::env::temp_dir().join("purge-test-logs");
    fs::create_dir_all(&root).expect("create temp test log dir");

    let log_path = root.join(format!("{}-{}.log", sanitize(case_name), now_millis()));
    let bin_path = resolve_bin_path();

    let mut cmd = Command::new(&bin_path);
    cmd.args(args)
        .current_dir(workdir)
        .env("HOME", workdir)
        .env("RUST_BACKTRACE", "1");
    for name in [
        "PURGE_LOG_FILE",
        "PURGE_LOG_LEVEL",
        "PURGE_LOG_STDOUT",
        "PURGE_ERROR_POLICY",
        "PURGE_FOLLOW_SYMLINKS",
        "PURGE_MAX_DEPTH",
    ] {
        cmd.env_remove(name);
    }
    let output = cmd.output().expect("execute purge command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let mut log_content = String::new();
    log_content.push_str(&format!("case={case_name}\n"));
    log_content.push_str(&format!("bin={}\n", bin_path.display()));
    log_content.push_str(&format!("args={args:?}\n"));
    log_content.push_str(&format!("status={}\n", output.status));
    log_content.push_str("----- stdout -----\n");
    log_content.push_str(&stdout);
    log_content.push('\n');
    log_content.push_str("----- stderr -----\n");
    log_content.push_str(&stderr);
    log_content.push('\n');
    fs::write(&log_path, log_content).expect("write test log");

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}

/// Create `dir/file{i}.txt` aged `i` days for `i` in `1..=count`.
pub fn aged_files(dir: &Path, count: u32) -> Vec<PathBuf> {
    let now = SystemTime::now();
    (1..=count)
        .map(|i| {
            let path = dir.join(format!("file{i}.txt"));
            fs::write(&path, format!("file {i}")).expect("write fixture");
            set_file_mtime(&path, FileTime::from_system_time(now - DAY * i))
                .expect("set fixture mtime");
            path
        })
        .collect()
}
