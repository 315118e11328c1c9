//! Integration tests for the model process client.
//!
//! The model is stood in for by `/bin/sh -c <script>`, so every outcome of a
//! real model process can be reproduced without the model installed.

#![cfg(unix)]
#![allow(clippy::unwrap_used, clippy::panic)]

use cropwise::model::ModelClient;
use cropwise_core::CropwiseError;
use std::time::{Duration, Instant};

/// A client that runs `script` under the system shell.
fn shell(script: &str, timeout: Duration) -> ModelClient {
    ModelClient::new(
        "/bin/sh",
        vec!["-c".to_string(), script.to_string()],
        timeout,
    )
}

// =============================================================================
// SUCCESS
// =============================================================================

#[test]
fn test_reply_is_stdout() {
    let client = shell("cat", Duration::from_secs(10));
    let reply = client.query("Plant sorghum this season.").unwrap();
    assert_eq!(reply, "Plant sorghum this season.");
}

#[test]
fn test_reply_is_trimmed() {
    let client = shell("printf '  rotate with legumes \\n\\n'", Duration::from_secs(10));
    assert_eq!(client.query("q").unwrap(), "rotate with legumes");
}

#[test]
fn test_large_output_does_not_stall() {
    let client = shell(
        "cat > /dev/null; head -c 200000 /dev/zero | tr '\\000' 'a'",
        Duration::from_secs(10),
    );
    let reply = client.query("q").unwrap();
    assert_eq!(reply.len(), 200_000);
}

#[test]
fn test_large_prompt_ignored_by_model() {
    let prompt = "soil ".repeat(200_000);
    let client = shell("echo ok", Duration::from_secs(10));
    assert_eq!(client.query(&prompt).unwrap(), "ok");
}

// =============================================================================
// FAILURES
// =============================================================================

#[test]
fn test_empty_output() {
    let client = shell("cat > /dev/null", Duration::from_secs(10));
    let result = client.query("anything");
    assert!(matches!(result, Err(CropwiseError::EmptyModelOutput)));
}

#[test]
fn test_whitespace_only_output_is_empty() {
    let client = shell("printf '\\n   \\n'", Duration::from_secs(10));
    assert!(matches!(
        client.query("q"),
        Err(CropwiseError::EmptyModelOutput)
    ));
}

#[test]
fn test_nonzero_exit_carries_stderr() {
    let client = shell("echo 'model llama2 not pulled' >&2; exit 3", Duration::from_secs(10));
    match client.query("q") {
        Err(CropwiseError::ModelFailed { code, stderr }) => {
            assert_eq!(code, Some(3));
            assert_eq!(stderr, "model llama2 not pulled");
        }
        other => panic!("expected ModelFailed, got {:?}", other),
    }
}

#[test]
fn test_nonzero_exit_message_embeds_stderr() {
    let client = shell("echo 'out of memory' >&2; exit 1", Duration::from_secs(10));
    let err = client.query("q").unwrap_err();
    assert!(err.to_string().contains("out of memory"));
    assert_eq!(err.kind(), "model_failed");
}

#[test]
fn test_timeout_kills_child() {
    let client = shell("exec sleep 5", Duration::from_millis(300));
    let start = Instant::now();
    let result = client.query("q");
    let elapsed = start.elapsed();

    assert!(matches!(result, Err(CropwiseError::ModelTimeout(300))));
    assert!(elapsed >= Duration::from_millis(300));
    assert!(elapsed < Duration::from_secs(4), "took {:?}", elapsed);
}

#[test]
fn test_lingering_descendant_hits_deadline() {
    // The shell exits at once; its background child keeps stdout open.
    let client = shell("echo hi; sleep 3 &", Duration::from_millis(500));
    let start = Instant::now();
    let result = client.query("q");
    let elapsed = start.elapsed();

    assert!(matches!(result, Err(CropwiseError::ModelTimeout(500))));
    assert!(elapsed >= Duration::from_millis(450), "took {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(2500), "took {:?}", elapsed);
}

#[test]
fn test_descendant_output_within_deadline_is_kept() {
    let client = shell("echo hi; (sleep 0.2; echo there) &", Duration::from_secs(10));
    assert_eq!(client.query("q").unwrap(), "hi\nthere");
}

#[test]
fn test_missing_executable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ollama");
    let client = ModelClient::new(&path, vec!["run".to_string()], Duration::from_secs(1));

    match client.query("q") {
        Err(CropwiseError::ExecutableNotFound(p)) => assert!(p.ends_with("ollama")),
        other => panic!("expected ExecutableNotFound, got {:?}", other),
    }
}

#[test]
fn test_non_executable_file_is_unexpected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.txt");
    std::fs::write(&path, "not a program").unwrap();

    let client = ModelClient::new(&path, vec![], Duration::from_secs(1));
    assert!(matches!(
        client.query("q"),
        Err(CropwiseError::Unexpected(_))
    ));
}
