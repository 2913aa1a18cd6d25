use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

fn get_binary_path() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // test binary name
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("mukai");
    path
}

// Runs in an empty directory with an empty HOME so no stray config is picked up
fn run_mukai_in(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(get_binary_path())
        .args(args)
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("MUKAI_CONFIG")
        .env_remove("MUKAI_DEGREE")
        .env_remove("MUKAI_OUTPUT")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute mukai binary")
}

fn run_mukai(args: &[&str]) -> Output {
    let dir = TempDir::new().unwrap();
    run_mukai_in(&dir, args)
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn test_help_command() {
    let output = run_mukai(&["--help"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("I(n,len)"));
    assert!(stdout.contains("MUKAI_DEGREE"));
}

#[test]
fn test_class_command() {
    let output = run_mukai(&["class", "O(1)"]);
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "O(1): ch = (1, 1, 0), v = (1, 1, 1)");

    let output = run_mukai(&["--degree", "4", "class", "I(1,3)"]);
    assert_eq!(stdout_of(&output), "I(1,3): ch = (1, 1, -1), v = (1, 1, 0)");
}

#[test]
fn test_ring_commands() {
    let output = run_mukai(&["cup", "k", "k"]);
    assert_eq!(stdout_of(&output), "(0, 0, 0)");

    let output = run_mukai(&["--degree", "2", "pow", "(1,1,0)", "-1"]);
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "(1, -1, 2)");

    let output = run_mukai(&["--degree", "2", "div", "O(1)", "O(1)"]);
    assert_eq!(stdout_of(&output), "(1, 0, 0)");

    let output = run_mukai(&["pow", "(-1,0,0)", "-9223372036854775808"]);
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "(1, 0, 0)");
}

#[test]
fn test_non_invertible_fails() {
    let output = run_mukai(&["div", "O(1)", "(2,0,0)"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not invertible"));

    let output = run_mukai(&["pow", "O(1)", "1/2"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not an integer"));
}

#[test]
fn test_chi_and_hom() {
    let output = run_mukai(&["chi", "O(0)", "O(1)"]);
    assert_eq!(stdout_of(&output), "2");

    let output = run_mukai(&["hom", "O(0)", "O(-1)"]);
    assert_eq!(stdout_of(&output), "0");

    let output = run_mukai(&["--degree", "4", "hom", "O(0)", "O(2)"]);
    assert_eq!(stdout_of(&output), "10");
}

#[test]
fn test_hom_gaps_are_errors() {
    let output = run_mukai(&["hom", "I(0,1)", "I(1,2)"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not implemented"));

    let output = run_mukai(&["hom", "(1,0,0)", "O(1)"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unsupported operand kind"));
}

#[test]
fn test_charge_command() {
    let output = run_mukai(&["charge", "O(1)"]);
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "Z = -1 + 1i\nmu = 1");

    let output = run_mukai(&["charge", "k"]);
    assert!(stdout_of(&output).ends_with("mu = inf"));

    let output = run_mukai(&[
        "--degree", "2", "charge", "(1,1,1)", "--bridgeland", "--alpha", "2",
    ]);
    assert_eq!(stdout_of(&output), "Z = 3 + 4i\nmu = -0.75");
}

#[test]
fn test_json_output() {
    let output = run_mukai(&["--json", "ch", "(2,3,4)", "--degree", "2", "--beta", "1"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(value["ch"], serde_json::json!(["2", "1", "0"]));
    assert_eq!(value["beta"], "1");
}

#[test]
fn test_ch_keeps_fractional_rank() {
    let output = run_mukai(&["ch", "(1/2,0,0)", "--beta", "3"]);
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "ch(b = 3) = (1/2, -1, 2)");

    let output = run_mukai(&["charge", "(1/2,0,0)"]);
    assert!(stdout_of(&output).ends_with("0.5i\nmu = 0"));
}

#[test]
fn test_charge_rejects_non_finite_parameters() {
    let output = run_mukai(&["charge", "O(1)", "--bridgeland", "--alpha", "inf"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("must be finite"));

    let output = run_mukai(&["charge", "O(1)", "--beta", "NaN"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("must be finite"));
}

#[test]
fn test_json_slope_of_vertical_class() {
    let output = run_mukai(&["--json", "charge", "k"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(value["mu"], "inf");
}

#[test]
fn test_hom_overflow_is_an_error() {
    let output = run_mukai(&["hom", "O(-5)", "O(9223372036854775807)"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("numeric overflow"));
}

#[test]
fn test_config_file_sets_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(".mukai.toml"),
        "[surface]\ndegree = 4\n\n[output]\nformat = \"json\"\n",
    )
    .unwrap();

    let output = run_mukai_in(&dir, &["hom", "O(0)", "O(1)"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(value["hom"], 4);

    // command-line degree wins over the file
    let output = run_mukai_in(&dir, &["--degree", "1", "hom", "O(0)", "O(1)"]);
    let value: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(value["hom"], 3);
}

#[test]
fn test_invalid_degree_rejected() {
    let output = run_mukai(&["--degree", "0", "class", "O(1)"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("degree must be positive"));
}

#[test]
fn test_config_generate() {
    let output = run_mukai(&["config", "generate"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[surface]"));
    assert!(stdout.contains("degree = 1"));
}
