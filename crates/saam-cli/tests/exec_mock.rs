use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fixtures::{midstream_error_sse, sse_response, text_response};

const STREAM_PATH: &str = "/models/gemini-2.5-flash:streamGenerateContent";

#[tokio::test]
async fn test_exec_streams_text_response() {
    let mock_server = MockServer::start().await;
    let home = tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .and(query_param("alt", "sse"))
        .and(header("x-goog-api-key", "test-api-key"))
        .respond_with(text_response(&["Hello", ", ", "world", "!"]))
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("saam")
        .env("SAAM_HOME", home.path())
        .env("GEMINI_API_KEY", "test-api-key")
        .env("GEMINI_BASE_URL", mock_server.uri())
        .args(["exec", "-p", "hello"])
        .assert()
        .success()
        // Full text received, order preserved from streaming
        .stdout(predicate::str::contains("Hello, world!"));
}

#[tokio::test]
async fn test_exec_model_override_targets_that_model() {
    let mock_server = MockServer::start().await;
    let home = tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-pro:streamGenerateContent"))
        .respond_with(text_response(&["Pro reply."]))
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("saam")
        .env("SAAM_HOME", home.path())
        .env("GEMINI_API_KEY", "test-api-key")
        .env("GEMINI_BASE_URL", mock_server.uri())
        .args(["exec", "-p", "hello", "-m", "gemini-2.5-pro"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pro reply."));
}

#[tokio::test]
async fn test_exec_fails_without_api_key() {
    let home = tempdir().unwrap();

    cargo_bin_cmd!("saam")
        .env("SAAM_HOME", home.path())
        .env_remove("GEMINI_API_KEY")
        .args(["exec", "-p", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GEMINI_API_KEY"));
}

#[tokio::test]
async fn test_exec_handles_api_error() {
    let mock_server = MockServer::start().await;
    let home = tempdir().unwrap();

    let error_body = serde_json::json!({
        "error": {
            "code": 401,
            "status": "UNAUTHENTICATED",
            "message": "API key not valid"
        }
    });

    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(error_body))
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("saam")
        .env("SAAM_HOME", home.path())
        .env("GEMINI_API_KEY", "invalid-key")
        .env("GEMINI_BASE_URL", mock_server.uri())
        .args(["exec", "-p", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("401"))
        .stderr(predicate::str::contains("API key not valid"));
}

#[tokio::test]
async fn test_exec_handles_api_error_midstream() {
    let mock_server = MockServer::start().await;
    let home = tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(sse_response(&midstream_error_sse(
            &["Starting..."],
            "UNAVAILABLE",
            "The model is temporarily overloaded",
        )))
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("saam")
        .env("SAAM_HOME", home.path())
        .env("GEMINI_API_KEY", "test-api-key")
        .env("GEMINI_BASE_URL", mock_server.uri())
        .args(["exec", "-p", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("An error occurred"))
        .stderr(predicate::str::contains(
            "The model is temporarily overloaded",
        ));
}

#[tokio::test]
async fn test_exec_missing_attachment_file_fails() {
    let home = tempdir().unwrap();

    cargo_bin_cmd!("saam")
        .env("SAAM_HOME", home.path())
        .env("GEMINI_API_KEY", "test-api-key")
        .args(["exec", "-p", "hello", "--attach", "/nonexistent/file.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("read attachment"));
}

#[tokio::test]
async fn test_exec_unreadable_docx_attachment_fails_before_the_model() {
    let mock_server = MockServer::start().await;
    let home = tempdir().unwrap();

    // Declared .docx but not a zip archive, so extraction fails.
    let attachment_path = home.path().join("notes.docx");
    std::fs::write(&attachment_path, b"plain text, not a zip").unwrap();

    cargo_bin_cmd!("saam")
        .env("SAAM_HOME", home.path())
        .env("GEMINI_API_KEY", "test-api-key")
        .env("GEMINI_BASE_URL", mock_server.uri())
        .args([
            "exec",
            "-p",
            "summarize",
            "--attach",
            attachment_path.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("extract Word attachment text"));

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.is_empty(), "model must not be called");
}
