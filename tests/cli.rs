use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cmd(server: &MockServer, dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("impfetch").unwrap();
    cmd.current_dir(dir)
        .env_remove("IMP_TOKEN_FILE")
        .env_remove("IMP_OUT_DIR")
        .env_remove("RUST_LOG")
        .args(["--host", "127.0.0.1", "--port"])
        .arg(server.address().port().to_string());
    cmd
}

async fn mount_listing(server: &MockServer, token: &str) {
    let cookie = format!("imp.token={}", token);
    Mock::given(method("GET"))
        .and(path("/ide/v3/models"))
        .and(header("cookie", cookie.as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "id": 1, "name": "Foo" }, { "id": 2, "name": "Bar" }])),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ide/v3/models/2/code"))
        .and(header("cookie", cookie.as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "agent": { "code": "a" }, "device": {} })),
        )
        .mount(server)
        .await;
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/account/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "imp.token=ABC123" })))
        .expect(1)
        .mount(server)
        .await;
}

#[test]
fn help_lists_flags() {
    Command::cargo_bin("impfetch")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--token-file"))
        .stdout(contains("--model"));
}

#[tokio::test]
async fn first_run_logs_in_saves_token_and_writes_agent_code() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_listing(&server, "ABC123").await;
    let dir = TempDir::new().unwrap();

    let mut cmd = cmd(&server, dir.path());
    tokio::task::spawn_blocking(move || {
        cmd.write_stdin("me@example.com\nsecret\n\nBar\n")
            .assert()
            .success()
            .stdout(contains("Enter your Imp IDE email address and password"))
            .stdout(contains("\tFoo\n\tBar\n"))
            .stdout(contains("Info: saved token"))
            .stdout(contains("Info: saved agent.nut\n"))
            .stdout(contains("Info: \"Bar\" has no device code"));
    })
    .await
    .unwrap();

    assert_eq!(std::fs::read_to_string(dir.path().join("imp-token.txt")).unwrap(), "ABC123");
    assert_eq!(std::fs::read_to_string(dir.path().join("agent.nut")).unwrap(), "a");
    assert!(!dir.path().join("device.nut").exists());
}

#[tokio::test]
async fn cached_token_skips_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ide/v3/session"))
        .and(header("cookie", "imp.token=CACHED"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "username": "alice" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/account/login"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    mount_listing(&server, "CACHED").await;
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("imp-token.txt"), "CACHED").unwrap();

    let mut cmd = cmd(&server, dir.path());
    tokio::task::spawn_blocking(move || {
        cmd.args(["--model", "Bar"])
            .write_stdin("")
            .assert()
            .success()
            .stdout(contains("Info: connected as alice"));
    })
    .await
    .unwrap();

    assert_eq!(std::fs::read_to_string(dir.path().join("agent.nut")).unwrap(), "a");
}

#[tokio::test]
async fn rejected_token_is_removed_and_login_follows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ide/v3/session"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    mount_login(&server).await;
    mount_listing(&server, "ABC123").await;
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("imp-token.txt"), "STALE").unwrap();

    let mut cmd = cmd(&server, dir.path());
    tokio::task::spawn_blocking(move || {
        cmd.write_stdin("me@example.com\nsecret\nn\nBar\n")
            .assert()
            .success()
            .stdout(contains("Info: the saved imp token appears to be no longer valid"));
    })
    .await
    .unwrap();

    assert!(!dir.path().join("imp-token.txt").exists());
}

#[tokio::test]
async fn unknown_model_exits_with_status_one() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ide/v3/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "username": "alice" })))
        .mount(&server)
        .await;
    mount_listing(&server, "CACHED").await;
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("imp-token.txt"), "CACHED").unwrap();

    let mut cmd = cmd(&server, dir.path());
    tokio::task::spawn_blocking(move || {
        cmd.write_stdin("Baz\n")
            .assert()
            .code(1)
            .stderr(contains("Error: no model has the name \"Baz\""));
    })
    .await
    .unwrap();

    assert!(!dir.path().join("agent.nut").exists());
}

#[tokio::test]
async fn login_without_token_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/account/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "invalid credentials" })))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let mut cmd = cmd(&server, dir.path());
    tokio::task::spawn_blocking(move || {
        cmd.write_stdin("me@example.com\nwrong\n")
            .assert()
            .code(1)
            .stderr(contains("Error: login failed"))
            .stderr(contains("invalid credentials"));
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn plain_text_session_reply_keeps_cached_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ide/v3/session"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/account/login"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    mount_listing(&server, "GOOD").await;
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("imp-token.txt"), "GOOD").unwrap();

    let mut cmd = cmd(&server, dir.path());
    tokio::task::spawn_blocking(move || {
        cmd.write_stdin("Bar\n")
            .assert()
            .success()
            .stdout(contains("no longer valid").not())
            .stdout(contains("Email: ").not());
    })
    .await
    .unwrap();

    assert_eq!(std::fs::read_to_string(dir.path().join("imp-token.txt")).unwrap(), "GOOD");
}

#[tokio::test]
async fn non_json_login_reply_is_quoted_in_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/account/login"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>Internal Server Error</html>"))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let mut cmd = cmd(&server, dir.path());
    tokio::task::spawn_blocking(move || {
        cmd.write_stdin("me@example.com\nsecret\n")
            .assert()
            .code(1)
            .stderr(contains("Error: login failed: <html>Internal Server Error</html>"));
    })
    .await
    .unwrap();

    assert!(!dir.path().join("imp-token.txt").exists());
}
