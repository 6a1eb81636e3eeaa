use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_psi_optimizer")
}

fn unique_temp_path(name: &str, ext: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("psi-optimizer-{name}-{stamp}.{ext}"))
}

fn run(args: &[&str]) -> Output {
    Command::new(bin())
        .args(args)
        .env("PSI_CONFIG", "/nonexistent/psi-config.yaml")
        .output()
        .expect("binary should run")
}

#[test]
fn missing_command_prints_usage() {
    let output = run(&[]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: psi_optimizer"));
}

#[test]
fn optimize_command_emits_json_report() {
    let output = run(&["optimize", "6", "leicht", "1", "--seed", "7"]);
    assert_eq!(output.status.code(), Some(0));
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("optimize should emit json");
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["seed"], 7);
    let total = payload["rolled"].as_u64().unwrap_or(0)
        + payload["expansion"].as_u64().unwrap_or(0)
        + payload["reserved"].as_u64().unwrap_or(0);
    assert_eq!(total, 6);
}

#[test]
fn optimize_command_table_mode() {
    let output = run(&["optimize", "6", "mittel", "2", "--seed", "1", "--table"]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut lines = stdout.lines();
    assert_eq!(
        lines.next(),
        Some("rolled\texpansion\treserved\twindow_min\twindow_max\tsuccess_percent")
    );
    assert_eq!(lines.next().map(|line| line.split('\t').count()), Some(6));
}

#[test]
fn optimize_command_fails_on_unknown_difficulty() {
    let output = run(&["optimize", "5", "bogus", "1", "--seed", "1"]);
    assert_eq!(output.status.code(), Some(1));
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("failure is still json");
    assert_eq!(payload["reason"], "invalid_difficulty");
}

#[test]
fn optimize_command_requires_numeric_inputs() {
    let output = run(&["optimize", "six", "leicht", "1"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("usage: psi_optimizer optimize"));
}

#[test]
fn probability_command_reports_exact_value() {
    let output = run(&["probability", "2", "7", "7"]);
    assert_eq!(output.status.code(), Some(0));
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("probability should emit json");
    let p = payload["probability"].as_f64().expect("probability");
    assert!((p - 1.0 / 6.0).abs() < 1e-12);
    assert_eq!(payload["method"], "exact");
}

#[test]
fn export_command_writes_candidate_csv() {
    let path = unique_temp_path("export", "csv");
    let output = run(&[
        "export",
        "5",
        "leicht",
        "1",
        "--seed",
        "3",
        "--out",
        path.to_string_lossy().as_ref(),
    ]);
    assert_eq!(output.status.code(), Some(0));

    let text = fs::read_to_string(&path).expect("csv should be written");
    let mut lines = text.lines();
    assert!(lines.next().unwrap_or("").starts_with("rolled,expansion,reserved"));
    let rows: Vec<&str> = lines.collect();
    assert!(!rows.is_empty());
    assert_eq!(rows.iter().filter(|row| row.ends_with(",true")).count(), 1);

    let _ = fs::remove_file(path);
}

#[test]
fn difficulties_command_uses_config_override() {
    let path = unique_temp_path("config", "yaml");
    fs::write(
        &path,
        "difficulties:\n  - { name: sehr schwer, min_target: 19, max_target: 23 }\n",
    )
    .expect("fixture should be written");

    let output = Command::new(bin())
        .arg("difficulties")
        .env("PSI_CONFIG", &path)
        .output()
        .expect("difficulties should run");
    assert_eq!(output.status.code(), Some(0));
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("difficulties should emit json");
    assert_eq!(payload["difficulties"][0]["name"], "sehr schwer");

    let _ = fs::remove_file(path);
}

#[test]
fn invalid_config_is_reported() {
    let path = unique_temp_path("bad-config", "yaml");
    fs::write(&path, "probability: [not, a, map]\n").expect("fixture should be written");

    let output = Command::new(bin())
        .args(["optimize", "6", "leicht", "1"])
        .env("PSI_CONFIG", &path)
        .output()
        .expect("optimize should run");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("config error"));

    let _ = fs::remove_file(path);
}
