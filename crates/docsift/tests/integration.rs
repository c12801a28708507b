use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const THREE_PARAGRAPHS: &str =
    "This is the first paragraph.\n\nThis is the second paragraph.\n\nAnd this is the third.";
const ORIGINAL: &str = "This is a test document for plagiarism detection.";

fn docsift_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("docsift");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let docs_dir = root.join("documents");
    fs::create_dir_all(&docs_dir).unwrap();
    fs::write(docs_dir.join("essay.txt"), THREE_PARAGRAPHS).unwrap();
    fs::write(docs_dir.join("f1.txt"), ORIGINAL).unwrap();
    fs::write(docs_dir.join("copy.txt"), ORIGINAL).unwrap();
    fs::write(
        docs_dir.join("f4.txt"),
        "This document has completely different content and should not match.",
    )
    .unwrap();

    // Port 9 (discard) on loopback: nothing listens, so rendering fails fast.
    let config_content = format!(
        r#"[db]
path = "{root}/data/docsift.sqlite"

[content]
root = "{root}/documents"
fetch_timeout_secs = 5

[wordcloud]
api_url = "http://127.0.0.1:9/wordcloud"
storage_path = "{root}/data/wordclouds"
timeout_secs = 2

[retry]
max_attempts = 1
initial_delay_ms = 0
max_delay_ms = 0

[logging]
level = "warn"
"#,
        root = root.display()
    );

    let config_path = config_dir.join("docsift.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_docsift(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = docsift_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run docsift binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_docsift(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));

    let (_, _, success) = run_docsift(&config_path, &["init"]);
    assert!(success, "second init failed (not idempotent)");
}

#[test]
fn test_analyze_prints_stats() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_docsift(&config_path, &["analyze", "essay.txt"]);
    assert!(success, "analyze failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("paragraphs:   3"));
    assert!(stdout.contains("words:        15"));
    assert!(stdout.contains("characters:   83"));
    assert!(stdout.contains("plagiarism:   no"));
    assert!(!stdout.contains("(stored result)"));
}

#[test]
fn test_analyze_twice_serves_stored_result() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success) = run_docsift(&config_path, &["analyze", "essay.txt"]);
    assert!(success);
    let (stdout, _, success) = run_docsift(&config_path, &["analyze", "essay.txt"]);
    assert!(success);
    assert!(stdout.contains("(stored result)"));
    assert!(stdout.contains("words:        15"));
}

#[test]
fn test_copy_is_flagged_and_recorded() {
    let (_tmp, config_path) = setup_test_env();

    for id in ["f1.txt", "f4.txt"] {
        let (_, stderr, success) = run_docsift(&config_path, &["analyze", id]);
        assert!(success, "analyze {} failed: {}", id, stderr);
    }

    let (stdout, stderr, success) = run_docsift(&config_path, &["analyze", "copy.txt", "--json"]);
    assert!(success, "analyze failed: {}", stderr);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["is_plagiarism"], true);
    assert_eq!(report["similar_ids"], serde_json::json!(["f1.txt"]));
    assert_eq!(report["cached"], false);

    let (stdout, _, success) = run_docsift(&config_path, &["similar", "copy.txt"]);
    assert!(success);
    assert!(stdout.contains("f1.txt"));
    assert!(!stdout.contains("f4.txt"));
}

#[test]
fn test_analyze_missing_document_fails() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_docsift(&config_path, &["analyze", "absent.txt"]);
    assert!(!success);
    assert!(stderr.contains("not found"), "stderr={}", stderr);
}

#[test]
fn test_word_cloud_failure_is_not_fatal() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) =
        run_docsift(&config_path, &["analyze", "essay.txt", "--wordcloud", "--json"]);
    assert!(success, "analyze failed: {}", stderr);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(report["word_cloud_location"].is_null());
    assert_eq!(report["stats"]["paragraph_count"], 3);
}

#[test]
fn test_wordcloud_unknown_location_fails() {
    let (tmp, config_path) = setup_test_env();
    let output = tmp.path().join("out.png");

    let (_, stderr, success) = run_docsift(
        &config_path,
        &["wordcloud", "missing.png", "--output", output.to_str().unwrap()],
    );
    assert!(!success);
    assert!(stderr.contains("not found"), "stderr={}", stderr);
    assert!(!output.exists());
}

#[test]
fn test_invalid_config_rejected() {
    let (_tmp, config_path) = setup_test_env();
    fs::write(&config_path, "[similarity]\nthreshold = 2.0\n").unwrap();

    let (_, stderr, success) = run_docsift(&config_path, &["init"]);
    assert!(!success);
    assert!(stderr.contains("threshold"), "stderr={}", stderr);
}
