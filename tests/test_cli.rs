//! End-to-end tests running the installed binaries.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn bin(name: &str) -> Command {
    Command::cargo_bin(name).unwrap()
}

// ============================================================================
// Shared driver behavior
// ============================================================================

#[test]
fn test_missing_required_argument_is_a_usage_error() {
    bin("date-spread")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("PATH"));
}

#[test]
fn test_unknown_flag_is_a_usage_error() {
    bin("date-spread")
        .arg("--no-such-flag")
        .arg(".")
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_help_mentions_common_flags() {
    bin("date-spread")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--verbose"))
        .stdout(predicate::str::contains("--pdb"))
        .stdout(predicate::str::contains("--post-mortem"));
}

#[test]
fn test_verbose_flags_are_accepted_and_log_to_stderr() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("file.txt"), b"x").unwrap();

    bin("date-spread")
        .arg("-vv")
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::is_empty().not());
}

#[test]
fn test_post_mortem_swallows_tool_errors() {
    bin("date-spread")
        .arg("--post-mortem")
        .arg("/definitely/not/a/real/path")
        .assert()
        .failure()
        .code(1);
}

// ============================================================================
// date-spread
// ============================================================================

#[test]
fn test_date_spread_counts_todays_files() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("a.fits"), b"x").unwrap();
    fs::write(dir.path().join("nested/b.fits"), b"y").unwrap();

    let today = chrono::Local::now().date_naive().to_string();
    bin("date-spread")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("DATE"))
        .stdout(predicate::str::contains(&today))
        .stdout(predicate::str::contains('2'));
}

#[test]
fn test_date_spread_json_output() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.fits"), b"x").unwrap();

    let output = bin("date-spread")
        .arg("--json")
        .arg(dir.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let today = chrono::Local::now().date_naive().to_string();
    assert_eq!(parsed[&today], serde_json::json!(1));
}

#[test]
fn test_date_spread_missing_root_fails() {
    bin("date-spread")
        .arg("/definitely/not/a/real/path")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

// ============================================================================
// pool-tools
// ============================================================================

const POOL_A: &str = "program,filename\n1069,jw.fits\n";
const POOL_B: &str = "program,filename\n1070,jw2.fits\n";

fn pool_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("jw01069_001_20230101t000000_pool.csv"),
        POOL_A,
    )
    .unwrap();
    fs::write(
        dir.path().join("jw01069_002_20230202t000000_pool.csv"),
        POOL_B,
    )
    .unwrap();
    dir
}

#[test]
fn test_pool_tools_requires_a_subcommand() {
    bin("pool-tools").assert().failure().code(2);
}

#[test]
fn test_pool_tools_list_latest_only() {
    let dir = pool_dir();
    bin("pool-tools")
        .args(["list", "--path"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("jw01069_002_20230202t000000_pool.csv"))
        .stdout(predicate::str::contains("jw01069_001").not());
}

#[test]
fn test_pool_tools_list_all() {
    let dir = pool_dir();
    bin("pool-tools")
        .args(["list", "--all", "--path"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("jw01069_001_20230101t000000_pool.csv"))
        .stdout(predicate::str::contains("jw01069_002_20230202t000000_pool.csv"));
}

#[test]
fn test_pool_tools_exam_prints_column_values() {
    let dir = pool_dir();
    bin("pool-tools")
        .args(["exam", "program", "--all", "--path"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1069"))
        .stdout(predicate::str::contains("1070"));
}

#[test]
fn test_pool_tools_exam_missing_column_still_succeeds() {
    let dir = pool_dir();
    bin("pool-tools")
        .args(["exam", "nope", "--path"])
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("no column 'nope'"));
}

#[test]
fn test_pool_tools_combine_writes_single_header() {
    let dir = pool_dir();
    let output = bin("pool-tools")
        .args(["combine", "--path"])
        .arg(dir.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let combined = String::from_utf8(output).unwrap();
    let combined = combined.trim();
    assert!(combined.contains("jw01069_999_"));

    let contents = fs::read_to_string(combined).unwrap();
    assert_eq!(contents.matches("program,filename").count(), 1);
    assert!(contents.contains("1069,jw.fits"));
    assert!(contents.contains("1070,jw2.fits"));
}

#[test]
fn test_pool_tools_list_empty_directory_fails() {
    let dir = TempDir::new().unwrap();
    bin("pool-tools")
        .args(["list", "--path"])
        .arg(dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no pool files found"));
}

// ============================================================================
// mast-get
// ============================================================================

#[test]
fn test_mast_get_requires_a_token() {
    let dir = TempDir::new().unwrap();
    bin("mast-get")
        .env_remove("MAST_API_TOKEN")
        .current_dir(dir.path())
        .arg("jw01410021001_02101_00001_guider1_uncal.fits")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("MAST_API_TOKEN"));
}

#[test]
fn test_mast_get_refuses_existing_file_without_overwrite() {
    let dir = TempDir::new().unwrap();
    let outdir = dir.path().join("out");
    fs::create_dir(&outdir).unwrap();
    fs::write(outdir.join("jw_uncal.fits"), b"keep me").unwrap();

    bin("mast-get")
        .env("MAST_API_TOKEN", "dummy")
        .arg("jw_uncal.fits")
        .arg("--output-dir")
        .arg(&outdir)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not overwritten"));

    assert_eq!(fs::read(outdir.join("jw_uncal.fits")).unwrap(), b"keep me");
}

#[test]
fn test_mast_get_reports_a_failed_download() {
    let dir = TempDir::new().unwrap();
    let outdir = dir.path().join("out");

    // RFC 2606 reserves .invalid, so resolution always fails.
    bin("mast-get")
        .env("MAST_API_TOKEN", "dummy")
        .arg("jw_uncal.fits")
        .arg("--output-dir")
        .arg(&outdir)
        .args(["--mast-url", "http://mast.invalid/download"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("download from"));

    // No partial file is left behind.
    assert!(!outdir.join("jw_uncal.fits").exists());
}

#[test]
fn test_mast_get_rejects_filename_with_directories() {
    bin("mast-get")
        .env("MAST_API_TOKEN", "dummy")
        .arg("sub/dir.fits")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("cannot include directories"));
}

// ============================================================================
// artifactory-up
// ============================================================================

#[test]
fn test_artifactory_up_prints_upload_commands() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("suite")).unwrap();
    fs::write(dir.path().join("suite/result.fits"), b"x").unwrap();

    bin("artifactory-up")
        .arg("--root")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("jfrog rt u "))
        .stdout(predicate::str::contains("suite/result.fits"));
}

#[test]
fn test_artifactory_up_days_zero_excludes_everything() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("old.fits"), b"x").unwrap();

    // With a window ending now-ish, a file created moments ago may or may
    // not make the cut, so use a large negative window to force exclusion.
    bin("artifactory-up")
        .arg("--root")
        .arg(dir.path())
        .arg("--days=-1")
        .assert()
        .success()
        .stdout(predicate::str::contains("jfrog").not());
}

#[test]
fn test_artifactory_up_requires_root_or_env() {
    bin("artifactory-up")
        .env_remove("TEST_BIGDATA")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("TEST_BIGDATA"));
}

#[test]
fn test_artifactory_up_reads_root_from_env() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("fresh.fits"), b"x").unwrap();

    bin("artifactory-up")
        .env("TEST_BIGDATA", dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("fresh.fits"));
}
