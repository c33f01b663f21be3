use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

// Defaults everywhere except a fast sampling interval
fn write_config(dir: &tempfile::TempDir, extra: &str) -> PathBuf {
    let toml = format!(
        r#"
[sampling]
interval_ms = 20

{extra}
"#
    );
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn scale(cfg: &Path) -> Command {
    let mut cmd = Command::cargo_bin("scale").unwrap();
    cmd.arg("--config").arg(cfg);
    cmd
}

fn json_lines(stdout: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("bad JSON {l:?}: {e}")))
        .collect()
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["read", "--help"], 0, "--simulate", "stdout")]
#[case(&["read", "--simulate", "--port", "COM3"], 2, "cannot be used with", "stderr")]
#[case(&["snapshot", "--override", "{\"weight\": 1}"], 2, "--simulate", "stderr")]
#[case(&["read", "--simulate", "--count", "0"], 2, "invalid value", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");
    let assert = scale(&cfg).args(args).assert().code(exit_code);
    let out = assert.get_output();
    let text = if stream == "stdout" {
        String::from_utf8_lossy(&out.stdout)
    } else {
        String::from_utf8_lossy(&out.stderr)
    };
    assert!(text.contains(needle), "expected {needle:?} in {stream}: {text}");
}

#[test]
fn simulated_snapshot_is_a_camel_case_payload() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");
    let out = scale(&cfg)
        .args(["snapshot", "--simulate"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let lines = json_lines(&out);
    assert_eq!(lines.len(), 1);
    let p = &lines[0];
    assert_eq!(p["targetWeight"], 5.0);
    assert_eq!(p["isConnected"], true);
    let w = p["weight"].as_f64().unwrap();
    assert!((0.0..=5.05).contains(&w), "{w}");
    assert!(p["percentComplete"].as_u64().unwrap() <= 100);
    assert!(p["timestamp"].as_f64().unwrap() > 1.0e9);
}

#[rstest]
#[case(r#"{"weight": 2.5}"#, 2.5, 50)]
#[case(r#"{"weight": -3.0}"#, 0.0, 0)]
#[case(r#"{"weight": 7.5}"#, 7.5, 100)]
fn override_is_applied_before_the_payload(
    #[case] body: &str,
    #[case] applied: f64,
    #[case] percent: u64,
) {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");
    let out = scale(&cfg)
        .args(["snapshot", "--simulate", "--override", body])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let lines = json_lines(&out);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], serde_json::json!({ "success": true, "weight": applied }));
    assert_eq!(lines[1]["weight"], applied);
    assert_eq!(lines[1]["percentComplete"], percent);
}

#[rstest]
#[case(r#"{"weight": "heavy"}"#)]
#[case(r#"{"kg": 1}"#)]
#[case("weight=1")]
fn bad_override_exits_with_code_7(#[case] body: &str) {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");
    scale(&cfg)
        .args(["snapshot", "--simulate", "--override", body])
        .assert()
        .code(7)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Override rejected"));
}

#[test]
fn simulated_read_prints_requested_rows() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");
    let out = scale(&cfg)
        .args(["read", "--simulate", "--count", "3"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8_lossy(&out);
    let rows: Vec<_> = text.lines().collect();
    assert_eq!(rows.len(), 3, "{text}");
    for row in rows {
        assert!(row.ends_with(" kg"), "{row}");
        assert_eq!(&row[2..3], ":", "{row}");
        assert_eq!(&row[8..9], ".", "{row}");
    }
}

#[test]
fn simulated_read_json_lines() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");
    let out = scale(&cfg)
        .args(["--json", "read", "--simulate", "--count", "2", "--raw"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let lines = json_lines(&out);
    assert_eq!(lines.len(), 2);
    for l in &lines {
        assert_eq!(l["parsed"], true);
        assert_eq!(l["unit"], "kg");
        assert_eq!(l["weight"], l["valueKg"]);
    }
}

#[test]
fn missing_port_exits_with_code_3() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");
    scale(&cfg)
        .args(["read", "--port", "COM-NONEXISTENT"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("was not found"));
}

#[test]
fn missing_port_from_config_reports_json() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "[serial]\nport = \"COM-NONEXISTENT\"\n");
    let out = scale(&cfg)
        .args(["--json", "snapshot"])
        .assert()
        .code(3)
        .get_output()
        .stderr
        .clone();
    let err = json_lines(&out)
        .into_iter()
        .find(|v| v.get("reason").is_some())
        .expect("error object on stderr");
    assert_eq!(err["reason"], "PortNotFound");
    assert_eq!(err["port"], "COM-NONEXISTENT");
}

#[test]
fn ports_lists_without_error() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");
    scale(&cfg).arg("ports").assert().success();
    let out = scale(&cfg)
        .args(["--json", "ports"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert!(v.is_array());
}

#[test]
fn invalid_config_is_explained() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "[simulation]\ntarget_weight_kg = -1.0\n");
    scale(&cfg)
        .args(["snapshot", "--simulate"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration is invalid"))
        .stderr(predicate::str::contains("simulation.target_weight_kg"));
}

#[test]
fn explicit_missing_config_is_an_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    scale(&missing)
        .args(["snapshot", "--simulate"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nope.toml"));
}
