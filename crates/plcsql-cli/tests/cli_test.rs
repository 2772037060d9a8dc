//! Runs the `plcsql` binary against the shared fixtures

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("tests")
        .join("fixtures")
}

fn plcsql(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_plcsql"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("plcsql runs")
}

fn arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 path")
}

#[test]
fn test_check_reports_each_unit() {
    let units = fixtures().join("units");
    let oracle = fixtures().join("oracle.json");
    let out = plcsql(&["check", arg(&units), "--oracle", arg(&oracle)]);

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout.lines().count(), 3, "{}", stdout);
    assert!(stdout.contains("function sum_rows"));
    assert!(stdout.contains("uses SQL"));
}

#[test]
fn test_check_failure_is_located() {
    let unit = fixtures().join("failing").join("scenario_b.json");
    let out = plcsql(&["check", arg(&unit)]);

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("scenario_b.json:4:8: error[E-TYPE-006]"), "{}", stderr);
}

#[test]
fn test_check_against_source_text() {
    let unit = fixtures().join("units").join("sum_rows.json");
    let source = fixtures().join("sum_rows.sql");
    let out = plcsql(&["check", arg(&unit), "--source", arg(&source)]);

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("E-TYPE-031"), "{}", stderr);
    assert!(stderr.contains("sum_rows.sql"), "{}", stderr);
}

#[test]
fn test_compile_writes_classes_and_markers() {
    let out_dir = tempfile::tempdir().unwrap();
    let unit = fixtures().join("units").join("sum_rows.json");
    let oracle = fixtures().join("oracle.json");
    let config = fixtures().join("config.json");
    let out = plcsql(&[
        "compile",
        arg(&unit),
        "--oracle",
        arg(&oracle),
        "--config",
        arg(&config),
        "-o",
        arg(out_dir.path()),
        "--markers",
    ]);

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let java = fs::read_to_string(out_dir.path().join("SpFunc_sum_rows.java")).unwrap();
    assert!(java.contains("public class SpFunc_sum_rows {"));
    let markers = fs::read_to_string(out_dir.path().join("SpFunc_sum_rows.markers")).unwrap();
    assert!(markers.starts_with(" (1,1,1"));
    assert!(java.contains(&markers));
}

#[test]
fn test_compile_stops_on_a_failing_unit() {
    let out_dir = tempfile::tempdir().unwrap();
    let unit = fixtures().join("failing").join("scenario_d.json");
    let out = plcsql(&["compile", arg(&unit), "-o", arg(out_dir.path())]);

    assert_eq!(out.status.code(), Some(1));
    assert_eq!(fs::read_dir(out_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_print_and_info() {
    let unit = fixtures().join("units").join("scenario_c.json");

    let out = plcsql(&["print", arg(&unit)]);
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.starts_with("CREATE OR REPLACE FUNCTION scenario_c"), "{}", text);

    let out = plcsql(&["info", arg(&unit)]);
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("class: Func_scenario_c"), "{}", text);
    assert!(text.contains("returns: STRING"), "{}", text);
}
