//! CLI smoke tests: verify the binary starts, handles flags, and exits cleanly.

use std::process::{Command, Stdio};

fn reverie_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_reverie"))
}

#[test]
fn test_help_flag() {
    let output = reverie_bin()
        .arg("--help")
        .output()
        .expect("failed to execute reverie");
    assert!(output.status.success(), "reverie --help should exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"), "help output should contain Usage");
    assert!(stdout.contains("--tick-secs"));
}

#[test]
fn test_version_flag() {
    let output = reverie_bin()
        .arg("--version")
        .output()
        .expect("failed to execute reverie");
    assert!(output.status.success(), "reverie --version should exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("reverie"), "version output should contain crate name");
}

#[test]
fn test_invalid_config_path_with_help() {
    let output = reverie_bin()
        .args(["--config", "/nonexistent/path/config.toml", "--help"])
        .output()
        .expect("failed to execute reverie");
    assert!(output.status.success());
}

#[test]
fn test_runs_bounded_cycles_with_mock() {
    let output = reverie_bin()
        .args([
            "--config",
            "/nonexistent/path/config.toml",
            "--provider",
            "mock",
            "--in-memory",
            "--tick-secs",
            "1",
            "--cycles",
            "1",
            "--seed",
            "3",
        ])
        .env("RUST_LOG", "warn")
        .stdin(Stdio::null())
        .output()
        .expect("failed to execute reverie");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cycle 1"), "stdout: {}", stdout);
}
