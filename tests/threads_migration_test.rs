//! Thread migration against a local mock of both APIs.
//!
//! Covers the full flow: list threads, retrieve messages, back up, summarize
//! via chat completions, create + annotate the destination thread, and the
//! skip/failure paths.

use std::fs;

use mockito::Matcher;
use serde_json::json;
use tempfile::TempDir;

use a2am::clients::agents::AgentsClient;
use a2am::clients::assistants::AssistantsClient;
use a2am::config::SourceConfig;
use a2am::migrate::{MigrateOptions, migrate_threads};

fn source_client(server: &mockito::Server) -> AssistantsClient {
    AssistantsClient::new(&SourceConfig {
        endpoint: server.url(),
        api_key: "test-key".to_string(),
        api_version: "2024-08-01-preview".to_string(),
    })
}

fn test_options(backup_dir: &TempDir) -> MigrateOptions {
    MigrateOptions {
        dry_run: false,
        limit: None,
        backup: true,
        backup_dir: backup_dir.path().to_path_buf(),
        pace: std::time::Duration::ZERO,
    }
}

fn thread_list_body() -> String {
    json!({
        "data": [
            {"id": "thread_full", "created_at": 1_700_000_000, "metadata": {"topic": "billing"}},
            {"id": "thread_empty", "created_at": 1_700_000_100, "metadata": {}}
        ],
        "has_more": false
    })
    .to_string()
}

fn messages_body() -> String {
    // Newest first, as the API returns them.
    json!({
        "data": [
            {
                "id": "msg_2",
                "role": "assistant",
                "assistant_id": "asst_1",
                "content": [{"type": "text", "text": {"value": "The invoice is paid."}}]
            },
            {
                "id": "msg_1",
                "role": "user",
                "content": [{"type": "text", "text": {"value": "Check invoice 42."}}]
            }
        ],
        "has_more": false
    })
    .to_string()
}

#[test]
fn migrates_thread_with_summary_and_skips_empty() {
    let mut source = mockito::Server::new();
    let mut dest = mockito::Server::new();

    source
        .mock("GET", "/openai/threads").match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(thread_list_body())
        .create();
    source
        .mock("GET", "/openai/threads/thread_full/messages").match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(messages_body())
        .create();
    source
        .mock("GET", "/openai/threads/thread_empty/messages").match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"data": [], "has_more": false}).to_string())
        .create();

    // Summarization prompt must read oldest message first.
    let summarize = source
        .mock("POST", "/openai/deployments/my-deployment/chat/completions").match_query(mockito::Matcher::Any)
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({"max_tokens": 1000, "temperature": 0.0})),
            Matcher::Regex("Check invoice 42(.|\\n)*The invoice is paid".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"choices": [{"message": {"role": "assistant", "content": "Invoice 42 was paid."}}]})
                .to_string(),
        )
        .create();

    dest.mock("GET", "/assistants").match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"data": [{"id": "agent_1"}], "has_more": false}).to_string())
        .create();
    let create_thread = dest
        .mock("POST", "/threads").match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"id": "thread_new"}).to_string())
        .create();
    let update_metadata = dest
        .mock("POST", "/threads/thread_new").match_query(mockito::Matcher::Any)
        .match_body(Matcher::PartialJson(json!({
            "metadata": {"orig_thread_id": "thread_full", "topic": "billing"}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"id": "thread_new"}).to_string())
        .create();
    let post_summary = dest
        .mock("POST", "/threads/thread_new/messages").match_query(mockito::Matcher::Any)
        .match_body(Matcher::PartialJson(json!({
            "role": "user",
            "content": "Invoice 42 was paid."
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"id": "msg_new"}).to_string())
        .create();

    let backup_dir = TempDir::new().expect("tempdir");
    let report = migrate_threads(
        &source_client(&source),
        &AgentsClient::new(&dest.url(), "test-token".to_string()),
        "my-deployment",
        &test_options(&backup_dir),
    )
    .expect("migration succeeds");

    summarize.assert();
    create_thread.assert();
    update_metadata.assert();
    post_summary.assert();

    assert_eq!(report.migrated.len(), 1);
    assert_eq!(report.migrated[0].source_id, "thread_full");
    assert_eq!(report.migrated[0].dest_id, "thread_new");
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].id, "thread_empty");
    assert_eq!(report.skipped[0].reason, "no messages");
    assert!(report.failed.is_empty());

    // Raw messages were backed up for the migrated thread only.
    let backed_up: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(backup_dir.path().join("thread_full.json")).expect("backup exists"),
    )
    .expect("backup is valid JSON");
    assert_eq!(backed_up.as_array().expect("array").len(), 2);
    assert!(!backup_dir.path().join("thread_empty.json").exists());
}

#[test]
fn summarization_failure_skips_destination_writes() {
    let mut source = mockito::Server::new();
    let mut dest = mockito::Server::new();

    source
        .mock("GET", "/openai/threads").match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"data": [{"id": "thread_full", "metadata": {}}], "has_more": false}).to_string(),
        )
        .create();
    source
        .mock("GET", "/openai/threads/thread_full/messages").match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(messages_body())
        .create();
    source
        .mock("POST", "/openai/deployments/dep/chat/completions").match_query(mockito::Matcher::Any)
        .with_status(429)
        .with_header("content-type", "application/json")
        .with_body(json!({"error": {"message": "rate limited", "code": "429"}}).to_string())
        .create();

    dest.mock("GET", "/assistants").match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"data": [{"id": "agent_1"}], "has_more": false}).to_string())
        .create();
    let no_thread_creates = dest.mock("POST", "/threads").match_query(mockito::Matcher::Any).expect(0).create();

    let backup_dir = TempDir::new().expect("tempdir");
    let report = migrate_threads(
        &source_client(&source),
        &AgentsClient::new(&dest.url(), "test-token".to_string()),
        "dep",
        &test_options(&backup_dir),
    )
    .expect("run completes despite the failure");

    no_thread_creates.assert();
    assert!(report.migrated.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].id, "thread_full");
    assert!(report.failed[0].error.contains("rate limited"));
}

#[test]
fn dry_run_backs_up_but_neither_summarizes_nor_creates() {
    let mut source = mockito::Server::new();
    let mut dest = mockito::Server::new();

    source
        .mock("GET", "/openai/threads").match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"data": [{"id": "thread_full", "metadata": {}}], "has_more": false}).to_string(),
        )
        .create();
    source
        .mock("GET", "/openai/threads/thread_full/messages").match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(messages_body())
        .create();
    let no_summaries = source
        .mock("POST", "/openai/deployments/dep/chat/completions").match_query(mockito::Matcher::Any)
        .expect(0)
        .create();
    let no_creates = dest.mock("POST", "/threads").match_query(mockito::Matcher::Any).expect(0).create();

    let backup_dir = TempDir::new().expect("tempdir");
    let mut opts = test_options(&backup_dir);
    opts.dry_run = true;

    let report = migrate_threads(
        &source_client(&source),
        &AgentsClient::new(&dest.url(), String::new()),
        "dep",
        &opts,
    )
    .expect("dry run succeeds");

    no_summaries.assert();
    no_creates.assert();
    assert_eq!(report.planned, vec!["thread_full".to_string()]);
    assert!(report.migrated.is_empty());
    assert!(backup_dir.path().join("thread_full.json").exists());
}

#[test]
fn message_retrieval_failure_is_recorded_per_thread() {
    let mut source = mockito::Server::new();
    let mut dest = mockito::Server::new();

    source
        .mock("GET", "/openai/threads").match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"data": [{"id": "thread_gone", "metadata": {}}], "has_more": false}).to_string(),
        )
        .create();
    source
        .mock("GET", "/openai/threads/thread_gone/messages").match_query(mockito::Matcher::Any)
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(json!({"error": {"message": "thread not found"}}).to_string())
        .create();
    dest.mock("GET", "/assistants").match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"data": [{"id": "agent_1"}], "has_more": false}).to_string())
        .create();

    let backup_dir = TempDir::new().expect("tempdir");
    let report = migrate_threads(
        &source_client(&source),
        &AgentsClient::new(&dest.url(), "test-token".to_string()),
        "dep",
        &test_options(&backup_dir),
    )
    .expect("run completes");

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].id, "thread_gone");
    assert!(report.failed[0].error.contains("thread not found"));
}
