use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_dir(prefix: &str) -> PathBuf {
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut dir = std::env::temp_dir();
    dir.push(format!("fnlab-tests-{}-{}", prefix, nonce));
    std::fs::create_dir_all(&dir).expect("Failed to create temp dir");
    dir
}

fn write_config(dir: &PathBuf, contents: &str) -> PathBuf {
    let path = dir.join("lab.yaml");
    std::fs::write(&path, contents).expect("Failed to write config");
    path
}

const FAST_CONFIG: &str = r#"
schema_version: "1.0"
student_name: "Ada"
timing:
  test_period_ms: 0
  idle_period_ms: 0
"#;

fn read_result(dir: &PathBuf) -> serde_json::Value {
    let content = std::fs::read_to_string(dir.join("result.json")).expect("result.json missing");
    serde_json::from_str(&content).unwrap()
}

#[test]
fn test_reference_run_writes_passing_result() {
    let dir = unique_dir("reference");
    let config = write_config(&dir, FAST_CONFIG);
    let out_dir = dir.join("artifacts");

    let output = Command::new(env!("CARGO_BIN_EXE_fnlab"))
        .args([
            "--config",
            config.to_str().unwrap(),
            "--output-dir",
            out_dir.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Ada: Functions Lab ALL TESTS COMPLETE"));
    assert!(stdout.contains(" Total point score: 25"));
    assert!(!stdout.contains("FAIL"));

    let result = read_result(&out_dir);
    assert_eq!(result["status"], "pass");
    assert_eq!(result["student"], "Ada");
    assert_eq!(result["routines"], "reference");
    assert_eq!(result["total_points"], 25);
    assert_eq!(result["max_points"], 25);
    assert_eq!(result["categories"].as_array().unwrap().len(), 5);
    assert_eq!(result["config"]["test_vectors"].as_array().unwrap().len(), 11);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_template_run_fails() {
    let dir = unique_dir("template");
    let config = write_config(&dir, FAST_CONFIG);

    let output = Command::new(env!("CARGO_BIN_EXE_fnlab"))
        .args([
            "--config",
            config.to_str().unwrap(),
            "--routines",
            "template",
            "--output-dir",
            dir.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("FAIL"));

    let result = read_result(&dir);
    assert_eq!(result["status"], "fail");
    assert_eq!(result["routines"], "template");
    assert!(result["total_points"].as_u64().unwrap() < 25);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_partial_run_flags_rerun() {
    let dir = unique_dir("partial");
    let config = write_config(
        &dir,
        r#"
schema_version: "1.0"
test_vectors: [0x00020003, 0xFFFC0003]
categories:
  run_unpack: false
  run_abs: false
timing:
  test_period_ms: 0
  idle_period_ms: 0
"#,
    );

    let output = Command::new(env!("CARGO_BIN_EXE_fnlab"))
        .args([
            "--config",
            config.to_str().unwrap(),
            "--output-dir",
            dir.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("PARTIAL tests complete"));

    let result = read_result(&dir);
    assert_eq!(result["status"], "partial");
    assert_eq!(result["total_points"], 15);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_no_uart_stdout_keeps_stdout_clean() {
    let dir = unique_dir("quiet");
    let config = write_config(&dir, FAST_CONFIG);

    let output = Command::new(env!("CARGO_BIN_EXE_fnlab"))
        .args([
            "--config",
            config.to_str().unwrap(),
            "--no-uart-stdout",
            "--verbose",
        ])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_verbose_prints_passes() {
    let dir = unique_dir("verbose");
    let config = write_config(&dir, FAST_CONFIG);

    let output = Command::new(env!("CARGO_BIN_EXE_fnlab"))
        .args(["--config", config.to_str().unwrap(), "--verbose"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("PASS"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_invalid_config_rejected() {
    let dir = unique_dir("invalid");
    let config = write_config(&dir, "schema_version: \"9.9\"\n");

    let output = Command::new(env!("CARGO_BIN_EXE_fnlab"))
        .args(["--config", config.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Unsupported schema_version"));

    let _ = std::fs::remove_dir_all(&dir);
}
