//! Smoke tests for the pgdelta binary. Nothing here needs a database;
//! the compare path is covered by the ignored tests in pgdelta-diff.

use assert_cmd::Command;
use predicates::prelude::*;

fn pgdelta() -> Command {
    Command::cargo_bin("pgdelta").expect("binary builds")
}

#[test]
fn help_lists_subcommands() {
    pgdelta()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("compare"))
        .stdout(predicate::str::contains("histogram"))
        .stdout(predicate::str::contains("schemas"));
}

#[test]
fn config_init_then_check_roundtrip() {
    let dir = tempfile::tempdir().expect("tempdir");

    pgdelta()
        .current_dir(dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote config.yml"));

    assert!(dir.path().join("config.yml").is_file());

    pgdelta()
        .current_dir(dir.path())
        .args(["config", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config ok"));
}

#[test]
fn config_init_refuses_overwrite() {
    let dir = tempfile::tempdir().expect("tempdir");

    pgdelta()
        .current_dir(dir.path())
        .args(["config", "init"])
        .assert()
        .success();

    pgdelta()
        .current_dir(dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn config_show_redacts_passwords() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("config.yml"),
        "source:\n  username: u\n  password: hush\n  server: s\n  database: d\n",
    )
    .expect("write config");

    pgdelta()
        .current_dir(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("********"))
        .stdout(predicate::str::contains("hush").not());
}

#[test]
fn config_check_flags_incomplete_sections() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("config.yml"),
        "source:\n  username: u\n",
    )
    .expect("write config");

    pgdelta()
        .current_dir(dir.path())
        .args(["config", "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("source"));
}

#[test]
fn histogram_emit_sql_needs_no_database() {
    pgdelta()
        .args([
            "histogram",
            "--table",
            "geochron.ages",
            "--value-column",
            "age",
            "--key-column",
            "analysis_id",
            "--lower",
            "0",
            "--upper",
            "100",
            "--width",
            "25",
            "--emit-sql",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "not (c.upper < o.upper and t.\"age\" = c.upper)",
        ))
        .stdout(predicate::str::contains("count(distinct t.\"analysis_id\")"));
}

#[test]
fn histogram_rejects_zero_width() {
    pgdelta()
        .args([
            "histogram",
            "--table",
            "ages",
            "--value-column",
            "age",
            "--key-column",
            "id",
            "--lower",
            "0",
            "--upper",
            "100",
            "--width",
            "0",
            "--emit-sql",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("width"));
}

#[test]
fn compare_accepts_both_break_on_diff_flags() {
    let dir = tempfile::tempdir().expect("tempdir");

    // Both spellings must parse; with no config present the run dies on
    // the config error, not on argument parsing.
    for flag in ["--break-on-diff", "--no-break-on-diff"] {
        pgdelta()
            .current_dir(dir.path())
            .args(["compare", flag])
            .assert()
            .failure()
            .stderr(predicate::str::contains("config.yml"))
            .stderr(predicate::str::contains("unexpected argument").not());
    }
}

#[test]
fn compare_fails_without_config() {
    let dir = tempfile::tempdir().expect("tempdir");

    pgdelta()
        .current_dir(dir.path())
        .args(["compare"])
        .assert()
        .failure();
}
