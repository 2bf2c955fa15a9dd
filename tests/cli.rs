//! End-to-end tests for the `scribe` binary.
//!
//! Each test spawns the compiled binary against a local mock of the
//! service API, so the full surface (config resolution, CLI overrides,
//! artifact writing, remedy hints, exit codes) is exercised for real.

use std::path::{Path, PathBuf};
use std::process::Command;

fn scribe_binary() -> PathBuf {
    let mut path = std::env::current_exe().expect("test binary path");
    path.pop(); // deps/
    path.pop(); // debug/
    path.push("scribe");
    path
}

fn run_scribe(args: &[&str], config: &Path) -> (String, String, bool) {
    let output = Command::new(scribe_binary())
        .args(args)
        .arg("--config")
        .arg(config)
        .env_remove("GEMINI_API_KEY")
        .output()
        .expect("run scribe");
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

fn run_scribe_in(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(scribe_binary())
        .args(args)
        .current_dir(dir)
        .env_remove("GEMINI_API_KEY")
        .output()
        .expect("run scribe");
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

fn write_config(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("scribe.toml");
    std::fs::write(&path, body).expect("write config");
    path
}

fn config_for(server_url: &str, extra: &str) -> String {
    format!(
        "[service]\napi_key = \"test-key\"\nbase_url = \"{server_url}\"\n\n{extra}\n"
    )
}

fn audio_in(dir: &Path) -> PathBuf {
    let path = dir.join("lecture.mp3");
    std::fs::write(&path, b"fake-mp3-bytes").expect("write audio");
    path
}

fn completion_body(text: &str) -> String {
    serde_json::json!({
        "candidates": [{"content": {"parts": [{"text": text}]}}]
    })
    .to_string()
}

#[test]
fn notes_end_to_end_writes_all_three_artifacts() {
    let mut server = mockito::Server::new();
    let upload = server
        .mock("POST", "/upload/v1beta/files")
        .match_header("x-goog-api-key", "test-key")
        .with_status(200)
        .with_body(
            r#"{"file": {"name": "files/abc", "uri": "https://example.invalid/files/abc",
                "mimeType": "audio/mpeg", "state": "ACTIVE"}}"#,
        )
        .create();
    let generate = server
        .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
        .match_header("x-goog-api-key", "test-key")
        .with_status(200)
        .with_body(completion_body(
            "# Photosynthesis\n---SEPARATOR---\ndigraph G { light -> sugar }\n---SEPARATOR---\nQ1. What energizes photosynthesis?\nA1. Light.",
        ))
        .create();

    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &config_for(&server.url(), ""));
    let audio = audio_in(dir.path());
    let out = dir.path().join("study");

    let (stdout, stderr, success) = run_scribe(
        &[
            "notes",
            audio.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "--progress",
            "off",
        ],
        &config,
    );

    assert!(success, "notes failed: {stderr}");
    upload.assert();
    generate.assert();
    assert!(stdout.contains("note.md"), "unexpected stdout: {stdout}");
    assert_eq!(
        std::fs::read_to_string(out.join("note.md")).unwrap(),
        "# Photosynthesis\n"
    );
    assert_eq!(
        std::fs::read_to_string(out.join("concept-map.dot")).unwrap(),
        "digraph G { light -> sugar }"
    );
    assert_eq!(
        std::fs::read_to_string(out.join("quiz.md")).unwrap(),
        "\nQ1. What energizes photosynthesis?\nA1. Light."
    );
}

#[test]
fn without_output_only_the_note_reaches_stdout() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/upload/v1beta/files")
        .with_status(200)
        .with_body(r#"{"file": {"name": "files/abc", "state": "ACTIVE"}}"#)
        .create();
    server
        .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
        .with_status(200)
        .with_body(completion_body(
            "just the notes---SEPARATOR------SEPARATOR---secret quiz",
        ))
        .create();

    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &config_for(&server.url(), ""));
    let audio = audio_in(dir.path());

    let (stdout, stderr, success) = run_scribe(
        &["notes", audio.to_str().unwrap(), "--progress", "off"],
        &config,
    );

    assert!(success, "notes failed: {stderr}");
    assert!(stdout.contains("just the notes"), "unexpected stdout: {stdout}");
    assert!(
        !stdout.contains("secret quiz"),
        "quiz leaked into stdout: {stdout}"
    );
    assert!(stderr.contains("quiz available"), "unexpected stderr: {stderr}");
}

#[test]
fn exhausted_rate_limits_fail_with_a_wait_hint() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/upload/v1beta/files")
        .with_status(200)
        .with_body(r#"{"file": {"name": "files/abc", "state": "ACTIVE"}}"#)
        .create();
    server
        .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
        .with_status(429)
        .with_body(r#"{"error": {"message": "quota exceeded"}}"#)
        .expect(2)
        .create();

    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        &config_for(
            &server.url(),
            "[generation]\nmax_retries = 2\nbase_delay_secs = 1",
        ),
    );
    let audio = audio_in(dir.path());

    let (_, stderr, success) = run_scribe(
        &["notes", audio.to_str().unwrap(), "--progress", "off"],
        &config,
    );

    assert!(!success, "run should fail when the service stays busy");
    assert!(
        stderr.contains("rate limited through 2 attempts"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn missing_model_suggests_advertised_ones() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/upload/v1beta/files")
        .with_status(200)
        .with_body(r#"{"file": {"name": "files/abc", "state": "ACTIVE"}}"#)
        .create();
    server
        .mock("POST", "/v1beta/models/gemini-nope:generateContent")
        .with_status(404)
        .with_body(r#"{"error": {"message": "not found"}}"#)
        .create();
    server
        .mock("GET", "/v1beta/models")
        .with_status(200)
        .with_body(r#"{"models": [{"name": "models/gemini-2.0-flash"}]}"#)
        .create();

    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &config_for(&server.url(), ""));
    let audio = audio_in(dir.path());

    let (_, stderr, success) = run_scribe(
        &[
            "notes",
            audio.to_str().unwrap(),
            "--model",
            "gemini-nope",
            "--progress",
            "off",
        ],
        &config,
    );

    assert!(!success);
    assert!(
        stderr.contains("Model 'gemini-nope' was not found"),
        "unexpected stderr: {stderr}"
    );
    assert!(
        stderr.contains("gemini-2.0-flash"),
        "advertised models missing from stderr: {stderr}"
    );
}

#[test]
fn processing_timeout_reports_the_poll_bound() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/upload/v1beta/files")
        .with_status(200)
        .with_body(r#"{"file": {"name": "files/slow", "state": "PROCESSING"}}"#)
        .create();
    server
        .mock("GET", "/v1beta/files/slow")
        .with_status(200)
        .with_body(r#"{"name": "files/slow", "state": "PROCESSING"}"#)
        .expect(2)
        .create();

    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        &config_for(&server.url(), "[polling]\ninterval_secs = 1\nmax_polls = 2"),
    );
    let audio = audio_in(dir.path());

    let (_, stderr, success) = run_scribe(
        &["notes", audio.to_str().unwrap(), "--progress", "off"],
        &config,
    );

    assert!(!success);
    assert!(
        stderr.contains("still processing after 2 checks"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn missing_api_key_is_a_clear_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");
    let audio = audio_in(dir.path());

    let (_, stderr, success) = run_scribe(
        &["notes", audio.to_str().unwrap(), "--progress", "off"],
        &config,
    );

    assert!(!success);
    assert!(
        stderr.contains("No API key configured"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn unknown_style_is_rejected_before_any_network_call() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &config_for("http://127.0.0.1:9", ""));
    let audio = audio_in(dir.path());

    let (_, stderr, success) = run_scribe(
        &[
            "notes",
            audio.to_str().unwrap(),
            "--style",
            "bogus",
            "--progress",
            "off",
        ],
        &config,
    );

    assert!(!success);
    assert!(
        stderr.contains("Unknown note style"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn models_lists_what_the_service_advertises() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/v1beta/models")
        .match_header("x-goog-api-key", "test-key")
        .with_status(200)
        .with_body(
            r#"{"models": [{"name": "models/gemini-2.0-flash"}, {"name": "models/gemini-1.5-flash"}]}"#,
        )
        .create();

    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &config_for(&server.url(), ""));

    let (stdout, stderr, success) = run_scribe(&["models"], &config);

    assert!(success, "models failed: {stderr}");
    assert!(stdout.contains("gemini-2.0-flash"), "unexpected stdout: {stdout}");
    assert!(stdout.contains("gemini-1.5-flash"), "unexpected stdout: {stdout}");
}

#[test]
fn init_scaffolds_a_config_and_respects_force() {
    let dir = tempfile::tempdir().unwrap();

    let (stdout, stderr, success) = run_scribe_in(dir.path(), &["init"]);
    assert!(success, "init failed: {stderr}");
    assert!(stdout.contains("Wrote"), "unexpected stdout: {stdout}");
    let scaffolded = dir.path().join("scribe.toml");
    assert!(scaffolded.exists());
    let body = std::fs::read_to_string(&scaffolded).unwrap();
    assert!(body.contains("[generation]"), "template incomplete: {body}");

    let (_, stderr, success) = run_scribe_in(dir.path(), &["init"]);
    assert!(!success, "second init should refuse to overwrite");
    assert!(stderr.contains("already exists"), "unexpected stderr: {stderr}");

    let (_, stderr, success) = run_scribe_in(dir.path(), &["init", "--force"]);
    assert!(success, "forced init failed: {stderr}");
}
