//! Testes de integração para a CLI do memokit.

use std::process::Command;

use tempfile::TempDir;

fn memokit_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_memokit"))
}

fn stdout_of(args: &[&str]) -> String {
    let output = memokit_bin()
        .args(args)
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "memokit {:?} failed", args);
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_version_command() {
    let stdout = stdout_of(&["version"]);
    assert!(stdout.contains("memokit"));
}

#[test]
fn test_help_command() {
    let stdout = stdout_of(&["--help"]);
    for command in ["init", "config", "key", "fib", "demo"] {
        assert!(stdout.contains(command), "help is missing '{}'", command);
    }
}

#[test]
fn test_key_is_canonical() {
    let first = stdout_of(&["key", r#"[1, {"b": 2, "a": 1}]"#]);
    let second = stdout_of(&["key", r#"[1, {"a": 1, "b": 2}]"#]);

    assert_eq!(first.trim(), r#"[1,{"a":1,"b":2}]"#);
    assert_eq!(first, second);
}

#[test]
fn test_key_respects_position() {
    let forward = stdout_of(&["key", "[2, 3]"]);
    let backward = stdout_of(&["key", "[3, 2]"]);
    assert_ne!(forward, backward);
}

#[test]
fn test_key_invalid_json_fails() {
    let output = memokit_bin()
        .args(["key", "[1,"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
}

#[test]
fn test_fib_outermost_only() {
    let stdout = stdout_of(&["fib", "10"]);
    assert!(stdout.contains("fib(10) = 55"));
    assert!(stdout.contains("invocations:        177"));
    assert!(stdout.contains("repeat invocations: 0"));
}

#[test]
fn test_fib_recursive_with_trace() {
    let stdout = stdout_of(&["fib", "20", "--recursive", "--trace"]);
    assert!(stdout.contains("fib(20) = 6765"));
    assert!(stdout.contains("invocations:        21"));
    assert!(stdout.contains("events:"));
    assert!(stdout.contains("hit"));
}

#[test]
fn test_demo_prints_scenarios() {
    let stdout = stdout_of(&["demo"]);
    assert!(stdout.contains("result = 55, underlying invocations = 177"));
    assert!(stdout.contains("results = 5 / 5, invocations = 2"));
    assert!(stdout.contains("errors = 2, results = 10 / 10, invocations = 3"));
}

#[test]
fn test_init_creates_config_and_sha256_keys() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("memokit.toml");

    let output = memokit_bin()
        .arg("init")
        .arg("--path")
        .arg(temp_dir.path())
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    assert!(config_path.exists());

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[general]"));
    assert!(content.contains("[keys]"));

    std::fs::write(&config_path, content.replace("canonical", "sha256")).unwrap();

    let output = memokit_bin()
        .arg("--config")
        .arg(&config_path)
        .args(["key", "[1, 2]"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let key = String::from_utf8_lossy(&output.stdout).trim().to_string();
    assert_eq!(key.len(), 64);
    assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_invalid_config_is_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("memokit.toml");
    std::fs::write(&config_path, "[general]\nlog_format = \"xml\"\n").unwrap();

    let output = memokit_bin()
        .arg("--config")
        .arg(&config_path)
        .arg("version")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
}
