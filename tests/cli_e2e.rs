//! End-to-end CLI tests for the sources binary.
//!
//! Only commands that stay offline are exercised here; network behavior is
//! covered by the wiremock integration tests.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary isolated from the user's config directory.
fn sources_cmd(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("sources").expect("binary should build");
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_binary_help_displays_usage() {
    let home = TempDir::new().expect("tempdir");
    sources_cmd(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Browse manga sites"));
}

#[test]
fn test_binary_version_displays_version() {
    let home = TempDir::new().expect("tempdir");
    sources_cmd(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sources"));
}

#[test]
fn test_binary_without_subcommand_fails() {
    let home = TempDir::new().expect("tempdir");
    sources_cmd(&home)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let home = TempDir::new().expect("tempdir");
    sources_cmd(&home)
        .args(["list", "--invalid-flag"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_list_prints_sources_as_json() {
    let home = TempDir::new().expect("tempdir");
    let output = sources_cmd(&home)
        .args(["--quiet", "list"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let listed: serde_json::Value = serde_json::from_slice(&output).expect("stdout is JSON");
    let ids: Vec<&str> = listed
        .as_array()
        .expect("array of sources")
        .iter()
        .filter_map(|source| source["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["mangasnosekai", "mhscans", "firstkissdashmanga", "slimeread"]);
    assert_eq!(listed[3]["lang"], "pt-BR");
}

#[test]
fn test_filters_prints_madara_order_by() {
    let home = TempDir::new().expect("tempdir");
    sources_cmd(&home)
        .args(["filters", "mangasnosekai"])
        .assert()
        .success()
        .stdout(predicate::str::contains("m_orderby").and(predicate::str::contains("latest2")));
}

#[test]
fn test_unknown_source_fails() {
    let home = TempDir::new().expect("tempdir");
    sources_cmd(&home)
        .args(["filters", "mangadex"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("mangadex"));
}

#[test]
fn test_search_filter_without_equals_fails() {
    let home = TempDir::new().expect("tempdir");
    sources_cmd(&home)
        .args(["search", "mhscans", "tower", "--filter", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("KEY=VALUE"));
}

#[test]
fn test_invalid_config_file_fails() {
    let home = TempDir::new().expect("tempdir");
    let config = home.path().join("bad.toml");
    std::fs::write(&config, "read_timeout_secs = 0\n").expect("write config");
    sources_cmd(&home)
        .arg("--config")
        .arg(&config)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("read_timeout_secs"));
}

#[test]
fn test_default_config_location_is_read() {
    let home = TempDir::new().expect("tempdir");
    let dir = home.path().join("manga-sources");
    std::fs::create_dir_all(&dir).expect("config dir");
    std::fs::write(dir.join("config.toml"), "unknown_key = 1\n").expect("write config");
    sources_cmd(&home)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown_key"));
}
