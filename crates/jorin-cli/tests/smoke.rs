use serde_json::json;
use std::process::{Command, Stdio};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn jorin(workdir: &TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_jorin"));
    command
        .current_dir(workdir.path())
        .env_remove("JORIN_MODEL")
        .env_remove("JORIN_PROTOCOL")
        .env_remove("RUST_LOG")
        .env("OPENAI_API_KEY", "sk-test")
        .stdin(Stdio::null());
    command
}

#[test]
fn help_lists_policy_flags() {
    let workdir = TempDir::new().expect("tempdir");
    let output = jorin(&workdir).arg("--help").output().expect("run jorin");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in [
        "--readonly",
        "--dry-shell",
        "--allow",
        "--deny",
        "--cwd",
        "--use-responses-api",
    ] {
        assert!(stdout.contains(flag), "help should mention {flag}");
    }
}

#[test]
fn missing_prompt_exits_with_usage_code() {
    let workdir = TempDir::new().expect("tempdir");
    let output = jorin(&workdir).output().expect("run jorin");
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no prompt"));
}

#[tokio::test(flavor = "multi_thread")]
async fn one_shot_prompt_prints_final_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "hello there"},
                         "finish_reason": "stop"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let workdir = TempDir::new().expect("tempdir");
    let mut command = tokio::process::Command::from(jorin(&workdir));
    let output = command
        .env("OPENAI_BASE_URL", server.uri())
        .args(["--model", "tiny", "say hi"])
        .output()
        .await
        .expect("run jorin");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "hello there\n");

    let requests = server.received_requests().await.expect("recorded");
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).expect("JSON");
    assert_eq!(body["model"], json!("tiny"));
    assert_eq!(body["messages"][1]["content"], json!("say hi"));
}

#[tokio::test(flavor = "multi_thread")]
async fn backend_failure_exits_non_zero() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let workdir = TempDir::new().expect("tempdir");
    let mut command = tokio::process::Command::from(jorin(&workdir));
    let output = command
        .env("OPENAI_BASE_URL", server.uri())
        .arg("hello")
        .output()
        .await
        .expect("run jorin");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("API 401: bad key"));
}
