use std::process::Command;
use tempfile::TempDir;

fn linecount() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_linecount"));
    command.env_remove("RUST_LOG");
    command
}

#[test]
fn test_logs_stay_off_stdout() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("absent.toml");

    let output = linecount()
        .args(["--verbose", "--log-format", "compact", "--validate-config", "--config"])
        .arg(&config)
        .output()
        .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {}", stderr);
    assert!(stdout.contains("Configuration is valid"));
    assert!(!stdout.contains("Starting linecount"));
    assert!(stderr.contains("Starting linecount"));
}

#[test]
fn test_print_config_is_valid_toml() {
    let output = linecount().arg("--print-config").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: toml::Value = toml::from_str(&stdout).unwrap();
    assert!(parsed.get("source").is_some());
    assert!(parsed.get("params").is_some());
}
