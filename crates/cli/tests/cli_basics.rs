use std::process::Command;

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_fnlab"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Functions Lab test harness"));
    assert!(stdout.contains("--routines"));
}

#[test]
fn test_cli_missing_config() {
    let output = Command::new(env!("CARGO_BIN_EXE_fnlab"))
        .arg("-c")
        .arg("non_existent_lab.yaml")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
}

#[test]
fn test_cli_rejects_unknown_routine_set() {
    let output = Command::new(env!("CARGO_BIN_EXE_fnlab"))
        .args(["--routines", "student"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
}
