use std::fs;
use tempfile::TempDir;

use gostwriter::{Error, Stage};

#[test]
fn run_reads_file_and_generates() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gost-config.yml");
    fs::write(
        &path,
        "defaults:\n  port: 8080\nenvironments:\n  staging:\n    vars:\n      host: example.com\n    command_template: \"-H {{.host}} -p {{.port}}\"\n",
    )
    .unwrap();

    let args = gostwriter::run(&path, "staging").unwrap();
    assert_eq!(args, vec!["-H", "example.com", "-p", "8080"]);
}

#[test]
fn run_reports_load_stage() {
    let dir = TempDir::new().unwrap();
    let err = gostwriter::run(dir.path().join("absent.yml"), "staging").unwrap_err();
    assert!(matches!(err, Error::ConfigNotFound { .. }));
    assert_eq!(err.stage(), Stage::Load);
}

#[test]
fn environment_values_always_win() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("c.yml");
    fs::write(
        &path,
        "defaults:\n  a: d1\n  b: d2\n  c: d3\nenvironments:\n  x:\n    vars:\n      a: e1\n      c: e3\n    gost_command: \"{{.a}} {{.b}} {{.c}}\"\n",
    )
    .unwrap();

    assert_eq!(gostwriter::run(&path, "x").unwrap(), vec!["e1", "d2", "e3"]);
}
