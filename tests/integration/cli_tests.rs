//! Binary-level tests for `bond --healthcheck` and startup validation.
//!
//! Each command runs in an empty temporary directory with a cleared
//! environment, so no env file or inherited variable leaks in. Env files are
//! written into that directory when a test needs them.

use std::time::Duration;

use assert_cmd::Command;
use assert_fs::fixture::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

use super::test_utils::{closed_port, png_router, TestServer};

/// Fresh, empty working directory for one command.
fn empty_dir() -> TempDir {
    TempDir::new().expect("Couldn't create a temp dir for tests")
}

fn bond(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bond").unwrap();
    cmd.env_clear()
        .current_dir(dir.path())
        .timeout(Duration::from_secs(30));
    cmd
}

#[tokio::test(flavor = "multi_thread")]
async fn test_healthcheck_succeeds_against_running_server() {
    let server = TestServer::start(png_router()).await;
    let dir = empty_dir();
    let port = server.port().to_string();

    tokio::task::spawn_blocking(move || {
        bond(&dir)
            .arg("--healthcheck")
            .env("PORT", port)
            .assert()
            .success()
            .stdout(predicate::str::contains("OK"));
    })
    .await
    .unwrap();
}

/// Run `bond --healthcheck` in `dir` off the async runtime and expect `OK`.
async fn assert_healthcheck_ok(dir: TempDir, envs: Vec<(&'static str, String)>) {
    tokio::task::spawn_blocking(move || {
        bond(&dir)
            .arg("--healthcheck")
            .envs(envs)
            .assert()
            .success()
            .stdout(predicate::str::contains("OK"));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_process_env_wins_over_default_env() {
    let server = TestServer::start(png_router()).await;
    let dir = empty_dir();
    dir.child("default.env")
        .write_str(&format!("PORT={}\n", closed_port()))
        .unwrap();

    assert_healthcheck_ok(dir, vec![("PORT", server.port().to_string())]).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_local_env_wins_over_process_env() {
    let server = TestServer::start(png_router()).await;
    let dir = empty_dir();
    dir.child(".env")
        .write_str(&format!("PORT={}\n", server.port()))
        .unwrap();

    assert_healthcheck_ok(dir, vec![("PORT", closed_port().to_string())]).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_local_env_wins_over_default_env() {
    let server = TestServer::start(png_router()).await;
    let dir = empty_dir();
    dir.child("default.env")
        .write_str(&format!("PORT={}\n", closed_port()))
        .unwrap();
    dir.child(".env")
        .write_str(&format!("PORT={}\n", server.port()))
        .unwrap();

    assert_healthcheck_ok(dir, Vec::new()).await;
}

#[test]
fn test_log_filter_from_env_file_applies() {
    // No SECRET, so startup fails right after logging is set up
    let dir = empty_dir();
    bond(&dir)
        .env("PORT", closed_port().to_string())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Configuration error"));

    let dir = empty_dir();
    dir.child(".env").write_str("RUST_LOG=off\n").unwrap();
    bond(&dir)
        .env("PORT", closed_port().to_string())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Configuration error").not());
}

#[test]
fn test_healthcheck_fails_without_server() {
    let dir = empty_dir();

    bond(&dir)
        .arg("--healthcheck")
        .env("PORT", closed_port().to_string())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Health check failed"));
}

#[test]
fn test_healthcheck_reads_port_from_env_file() {
    let dir = empty_dir();
    dir.child(".env")
        .write_str(&format!("PORT=\"{}\"\n", closed_port()))
        .unwrap();

    // The quoted port is accepted; the probe then fails because nothing listens
    bond(&dir)
        .arg("--healthcheck")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Health check failed"))
        .stderr(predicate::str::contains("Invalid PORT").not());
}

#[test]
fn test_healthcheck_invalid_port() {
    let dir = empty_dir();

    bond(&dir)
        .arg("--healthcheck")
        .env("PORT", "not-a-port")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Health check failed"));
}

#[test]
fn test_serve_without_secret_fails_fast() {
    let dir = empty_dir();

    bond(&dir)
        .env("PORT", closed_port().to_string())
        .env("MAX_SIZE", "500")
        .env("RECOVERY_LEVEL", "MEDIUM")
        .assert()
        .failure();
}

#[test]
fn test_serve_with_unknown_recovery_level_fails_fast() {
    let dir = empty_dir();

    bond(&dir)
        .env("PORT", closed_port().to_string())
        .env("SECRET", "abc123")
        .env("MAX_SIZE", "500")
        .env("RECOVERY_LEVEL", "ULTRA")
        .assert()
        .failure();
}

#[test]
fn test_serve_with_ssl_but_no_certificate_fails_fast() {
    let dir = empty_dir();

    bond(&dir)
        .env("PORT", closed_port().to_string())
        .env("SSL", "on")
        .env("SECRET", "abc123")
        .env("MAX_SIZE", "500")
        .env("RECOVERY_LEVEL", "HIGH")
        .assert()
        .failure();
}

#[test]
fn test_help_mentions_healthcheck() {
    Command::cargo_bin("bond")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--healthcheck"));
}
