use assert_cmd::{Command, cargo_bin_cmd};
use predicates::prelude::*;
use std::env;
use std::fs;
use std::path::PathBuf;

fn timeclock() -> Command {
    let mut cmd = cargo_bin_cmd!("timeclock");
    cmd.env_remove("TIMECLOCK_TOKEN")
        .env_remove("TIMECLOCK_BASE_URL");
    cmd
}

/// Unique config path inside the temp dir, with any previous run removed.
fn temp_config(name: &str) -> PathBuf {
    let mut dir = env::temp_dir();
    dir.push(format!("timeclock_{name}"));
    fs::remove_dir_all(&dir).ok();
    dir.join("config.yaml")
}

#[test]
fn format_time_prints_one_line_per_input() {
    timeclock()
        .args(["format-time", "900", "1730", "99", "8"])
        .assert()
        .success()
        .stdout("09:00\n17:30\n09:59\n08:00\n");
}

#[test]
fn format_time_leaves_non_digits_alone() {
    timeclock()
        .args(["format-time", "--", "--"])
        .assert()
        .success()
        .stdout("--\n");
}

#[test]
fn config_path_honours_flag() {
    let path = temp_config("path");
    timeclock()
        .args(["--config", path.to_str().unwrap(), "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.yaml"));
}

#[test]
fn config_init_writes_defaults_once() {
    let path = temp_config("init");
    timeclock()
        .args(["--config", path.to_str().unwrap(), "config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default config"));

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("base_url"));
    assert!(content.contains("request_timeout_secs: 30"));

    timeclock()
        .args(["--config", path.to_str().unwrap(), "config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn show_without_token_fails() {
    let path = temp_config("show");
    timeclock()
        .args(["--config", path.to_str().unwrap(), "show", "--user", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No API token configured"));
}

#[test]
fn invalid_base_url_is_rejected() {
    let path = temp_config("bad_url");
    timeclock()
        .args([
            "--config",
            path.to_str().unwrap(),
            "--base-url",
            "ftp://nowhere",
            "show",
            "--user",
            "5",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("base_url must start with"));
}

#[test]
fn help_lists_subcommands() {
    timeclock()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("format-time"))
        .stdout(predicate::str::contains("show"));
}
