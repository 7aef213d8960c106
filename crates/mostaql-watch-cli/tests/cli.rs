use std::io;
use std::net::TcpListener;
use std::process::{Command, Output};

use tempfile::{TempDir, tempdir};

// Nothing listens on the discard port, so a fetch fails fast.
const UNREACHABLE_URL: &str = "http://127.0.0.1:9/";

fn run(dir: &TempDir, token: Option<&str>, args: &[&str]) -> Output {
    run_against(UNREACHABLE_URL, dir, token, args)
}

fn run_against(url: &str, dir: &TempDir, token: Option<&str>, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mostaql-watch"));
    cmd.env_clear()
        .current_dir(dir.path())
        .env("MOSTAQL_STATE_DIR", dir.path().join("state"))
        .env("MOSTAQL_URL", url)
        .args(args);
    if let Some(token) = token {
        cmd.env("MOSTAQLWEB", token);
    }
    cmd.output().expect("Failed to run mostaql-watch")
}

#[test]
fn test_missing_token_exits_non_zero() {
    let dir = tempdir().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let url = format!("http://{}/", listener.local_addr().unwrap());

    let output = run_against(&url, &dir, None, &["check"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("MOSTAQLWEB"), "stderr: {stderr}");
    assert!(!dir.path().join("state").exists());
    match listener.accept() {
        Err(e) => assert_eq!(e.kind(), io::ErrorKind::WouldBlock),
        Ok((_, peer)) => panic!("dashboard was contacted from {peer}"),
    }
}

#[test]
fn test_empty_token_exits_non_zero() {
    let dir = tempdir().unwrap();

    let output = run(&dir, Some(""), &["check"]);

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_fetch_failure_exits_zero() {
    let dir = tempdir().unwrap();

    let output = run(&dir, Some("tok"), &["check", "--timeout", "5", "-o", "json"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"outcome\": \"fetch_failed\""), "stdout: {stdout}");
    assert!(!dir.path().join("state/last_seen_projects.json").exists());
    assert!(!dir.path().join("state/new_projects_notification.json").exists());
}

#[test]
fn test_baseline_without_state() {
    let dir = tempdir().unwrap();

    let output = run(&dir, None, &["baseline"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No baseline at"));
}
