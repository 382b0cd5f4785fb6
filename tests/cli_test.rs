//! CLI integration tests for the sqlreindent binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper: get a Command for the sqlreindent binary.
fn sqlreindent() -> Command {
    Command::cargo_bin("sqlreindent").expect("binary should exist")
}

/// Helper: create a temp directory with the given files.
fn setup_temp_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
    }
    dir
}

const UNFORMATTED: &str = "select a, b from t\n";
const FORMATTED: &str = "SELECT\n  a,\n  b\nFROM t\n";

// ─── Output modes ───

#[test]
fn test_prints_formatted_output() {
    let dir = setup_temp_dir(&[("query.sql", UNFORMATTED)]);
    sqlreindent()
        .arg(dir.path().join("query.sql"))
        .assert()
        .success()
        .stdout(FORMATTED);
    assert_eq!(
        fs::read_to_string(dir.path().join("query.sql")).unwrap(),
        UNFORMATTED
    );
}

#[test]
fn test_stdin() {
    sqlreindent()
        .arg("-")
        .write_stdin("SELECT '1', '2'")
        .assert()
        .success()
        .stdout("SELECT\n  '1',\n  '2'\n");
}

#[test]
fn test_stdin_error_exits_2() {
    sqlreindent()
        .arg("-")
        .write_stdin("SELECT 'open")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unterminated string"));
}

#[test]
fn test_write_mode_rewrites_file() {
    let dir = setup_temp_dir(&[("query.sql", UNFORMATTED)]);
    sqlreindent()
        .arg("--write")
        .arg(dir.path())
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("1 reformatted"));
    assert_eq!(
        fs::read_to_string(dir.path().join("query.sql")).unwrap(),
        FORMATTED
    );
}

#[test]
fn test_check_mode_fails_on_changes() {
    let dir = setup_temp_dir(&[("query.sql", UNFORMATTED)]);
    sqlreindent()
        .arg("--check")
        .arg(dir.path())
        .assert()
        .code(1);
    assert_eq!(
        fs::read_to_string(dir.path().join("query.sql")).unwrap(),
        UNFORMATTED
    );
}

#[test]
fn test_check_mode_passes_when_formatted() {
    let dir = setup_temp_dir(&[("query.sql", FORMATTED)]);
    sqlreindent()
        .arg("--check")
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("1 unchanged"));
}

#[test]
fn test_list_mode() {
    let dir = setup_temp_dir(&[("a.sql", UNFORMATTED), ("b.sql", FORMATTED)]);
    sqlreindent()
        .arg("--list")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("a.sql"))
        .stdout(predicate::str::contains("b.sql").not());
}

#[test]
fn test_diff_mode() {
    let dir = setup_temp_dir(&[("query.sql", UNFORMATTED)]);
    sqlreindent()
        .arg("--diff")
        .arg("--no-color")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("-select a, b from t"))
        .stdout(predicate::str::contains("+FROM t"));
}

#[test]
fn test_quiet_mode() {
    let dir = setup_temp_dir(&[("query.sql", FORMATTED)]);
    sqlreindent()
        .arg("--quiet")
        .arg("--check")
        .arg(dir.path())
        .assert()
        .success()
        .stderr("");
}

// ─── File selection ───

#[test]
fn test_ignores_other_extensions_and_excludes() {
    let dir = setup_temp_dir(&[
        ("notes.txt", "select 1"),
        ("vendor/q.sql", UNFORMATTED),
        ("q.sql", FORMATTED),
    ]);
    sqlreindent()
        .arg("--check")
        .arg("--exclude")
        .arg("vendor")
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("1 file(s) processed"));
}

#[test]
fn test_format_error_exits_2() {
    let dir = setup_temp_dir(&[("bad.sql", "select 'oops\n"), ("ok.sql", UNFORMATTED)]);
    sqlreindent()
        .arg("--write")
        .arg(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("bad.sql"));
    assert_eq!(
        fs::read_to_string(dir.path().join("bad.sql")).unwrap(),
        "select 'oops\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("ok.sql")).unwrap(),
        FORMATTED
    );
}

// ─── Go sources ───

#[test]
fn test_go_literals_rewritten() {
    let source = "package store\n\nfunc load() {\n\tdb.Query(`select a, b from t`)\n\tdb.Exec(`select 'oops`)\n}\n";
    let dir = setup_temp_dir(&[("store.go", source)]);
    sqlreindent()
        .arg("--write")
        .arg(dir.path())
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(dir.path().join("store.go")).unwrap(),
        "package store\n\nfunc load() {\n\tdb.Query(`SELECT\n  a,\n  b\nFROM t`)\n\tdb.Exec(`select 'oops`)\n}\n"
    );
}

#[test]
fn test_custom_method_flag() {
    let source = "db.MustExec(`delete from t`)\ndb.Exec(`delete from t`)\n";
    let dir = setup_temp_dir(&[("q.go", source)]);
    sqlreindent()
        .arg("--method")
        .arg("MustExec")
        .arg(dir.path().join("q.go"))
        .assert()
        .success()
        .stdout("db.MustExec(`DELETE\nFROM t`)\ndb.Exec(`delete from t`)\n");
}

// ─── Configuration ───

#[test]
fn test_config_file_is_discovered() {
    let dir = setup_temp_dir(&[
        ("sqlreindent.toml", "indent = \"    \"\n"),
        ("q.sql", "select a from t"),
    ]);
    sqlreindent()
        .arg(dir.path().join("q.sql"))
        .assert()
        .success()
        .stdout("SELECT\n    a\nFROM t\n");
}

#[test]
fn test_flags_override_config() {
    let dir = setup_temp_dir(&[
        ("sqlreindent.toml", "indent = \"    \"\n"),
        ("q.sql", "select a from t"),
    ]);
    sqlreindent()
        .arg("--indent")
        .arg("\t")
        .arg(dir.path().join("q.sql"))
        .assert()
        .success()
        .stdout("SELECT\n\ta\nFROM t\n");
}

#[test]
fn test_unknown_config_key_exits_2() {
    let dir = setup_temp_dir(&[
        ("sqlreindent.toml", "line_length = 80\n"),
        ("q.sql", "select 1"),
    ]);
    sqlreindent()
        .arg(dir.path().join("q.sql"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown config option"));
}
