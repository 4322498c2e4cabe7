//! CLI integration tests: analyze, backtest and init end to end.

use assert_cmd::Command;
use indoc::indoc;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Twelve quiet months then twelve escalating months for Essure, as JSON lines.
fn write_reports(dir: &Path) -> PathBuf {
    let mut lines = Vec::new();
    for month in 0..24u32 {
        let (year, m) = (2013 + month / 12, month % 12 + 1);
        let (count, deaths, patients) = if month < 12 { (10, 0, 1) } else { (42, 2, 40) };
        for i in 0..count {
            let event_type = if i < deaths {
                "Death"
            } else if month < 12 {
                "Other"
            } else {
                "Malfunction"
            };
            let source = if i < patients { "P" } else { "U" };
            lines.push(format!(
                r#"{{"device": "Essure", "date_received": "{year}{m:02}15", "event_type": "{event_type}", "report_source_code": "{source}"}}"#
            ));
        }
    }
    lines.push(r#"{"device": "Essure", "date_received": "not-a-date"}"#.to_string());
    let path = dir.join("reports.jsonl");
    fs::write(&path, lines.join("\n")).unwrap();
    path
}

fn write_milestones(dir: &Path) -> PathBuf {
    let path = dir.join("milestones.json");
    fs::write(
        &path,
        indoc! {r#"
            [
              {"device": "Essure", "kind": "first_filing", "date": "2014-07-20"},
              {"device": "IVC Filter", "kind": "first_filing", "date": "2014-01-10"}
            ]
        "#},
    )
    .unwrap();
    path
}

fn maude_risk(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("maude-risk").unwrap();
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_analyze_json_output_file() {
    let temp = TempDir::new().unwrap();
    let reports = write_reports(temp.path());
    let milestones = write_milestones(temp.path());
    let output = temp.path().join("report.json");

    maude_risk(temp.path())
        .args(["analyze", "--reports"])
        .arg(&reports)
        .arg("--milestones")
        .arg(&milestones)
        .args(["--format", "json", "--jobs", "1", "--output"])
        .arg(&output)
        .assert()
        .success();

    let json: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["rejected"]["malformed_date"], 1);
    let devices = json["devices"].as_array().unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0]["device"], "Essure");
    assert_eq!(devices[0]["timeline"]["lead_time_days"], 50);
    assert_eq!(devices[1]["device"], "IVC Filter");
    assert_eq!(devices[1]["assessment"]["tier"]["status"], "indeterminate");
}

#[test]
fn test_analyze_markdown_to_stdout() {
    let temp = TempDir::new().unwrap();
    let reports = write_reports(temp.path());

    let output = maude_risk(temp.path())
        .args(["analyze", "--format", "markdown", "--reports"])
        .arg(&reports)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("# Device Litigation-Risk Report"));
    assert!(stdout.contains("| Essure | 624 |"));
}

#[test]
fn test_backtest_reports_predictive_device() {
    let temp = TempDir::new().unwrap();
    let reports = write_reports(temp.path());
    let milestones = write_milestones(temp.path());

    let output = maude_risk(temp.path())
        .args(["backtest", "--format", "json", "--reports"])
        .arg(&reports)
        .arg("--milestones")
        .arg(&milestones)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["threshold"], "high");
    assert_eq!(json["summary"]["predictive"], 1);
    assert_eq!(json["summary"]["not_flagged"], 1);
}

#[test]
fn test_backtest_markdown_is_a_markdown_table() {
    let temp = TempDir::new().unwrap();
    let reports = write_reports(temp.path());
    let milestones = write_milestones(temp.path());

    let output = maude_risk(temp.path())
        .args(["backtest", "--format", "markdown", "--reports"])
        .arg(&reports)
        .arg("--milestones")
        .arg(&milestones)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("# Backtest at threshold High"));
    assert!(stdout.contains("| Essure | 2014-05 | 2014-07-20 | +50 days | predictive |"));
    assert!(stdout.contains("| IVC Filter | - | 2014-01-10 | not flagged | not flagged |"));
    assert!(stdout.contains("- Never flagged: 1"));
    assert!(!stdout.contains('┌'));
    assert!(!stdout.contains('\u{1b}'));
}

#[test]
fn test_config_file_thresholds_apply() {
    let temp = TempDir::new().unwrap();
    let reports = write_reports(temp.path());
    fs::write(
        temp.path().join(".maude-risk.toml"),
        indoc! {r#"
            [thresholds]
            death_escalation = 1000

            [output]
            default_format = "json"
        "#},
    )
    .unwrap();

    let output = maude_risk(temp.path())
        .args(["analyze", "--reports"])
        .arg(&reports)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    let triggered = json["devices"][0]["assessment"]["triggered"].as_array().unwrap();
    assert!(!triggered.contains(&Value::from("death_escalation")));
}

#[test]
fn test_invalid_window_is_rejected() {
    let temp = TempDir::new().unwrap();
    let reports = write_reports(temp.path());

    let output = maude_risk(temp.path())
        .args(["analyze", "--window", "0", "--reports"])
        .arg(&reports)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid configuration"), "{stderr}");
}

#[test]
fn test_missing_reports_file_fails() {
    let temp = TempDir::new().unwrap();
    maude_risk(temp.path())
        .args(["analyze", "--reports", "absent.json"])
        .assert()
        .failure();
}

#[test]
fn test_init_creates_config_once() {
    let temp = TempDir::new().unwrap();
    maude_risk(temp.path()).arg("init").assert().success();
    assert!(temp.path().join(".maude-risk.toml").exists());

    maude_risk(temp.path()).arg("init").assert().failure();
    maude_risk(temp.path()).args(["init", "--force"]).assert().success();
}
