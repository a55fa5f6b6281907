//! Integration tests: Gmail client and token refresh against a local fake server,
//! through to a ZIP written on disk.

mod common;

use std::io::{Cursor, Read};
use std::time::Duration;

use attachpack_core::archive::{build_archive, write_archive};
use attachpack_core::auth::{ensure_fresh, unix_now, ClientSecrets, StoredToken};
use attachpack_core::checksum;
use attachpack_core::collect::{collect_attachments, search, CollectOptions};
use attachpack_core::gmail::GmailClient;
use attachpack_core::retry::{RetryError, RetryErrorKind, RetryPolicy};
use common::gmail_server;
use tempfile::tempdir;

const LIST: &str = "/gmail/v1/users/me/messages";

fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(10),
    }
}

fn ok(body: &str) -> (u16, String) {
    (200, body.to_string())
}

fn google_error(code: u16, message: &str) -> (u16, String) {
    (
        code,
        format!(r#"{{"error":{{"code":{code},"message":"{message}"}}}}"#),
    )
}

fn message_json(id: &str, attachments: &[(&str, &str)]) -> String {
    let mut parts = vec![serde_json::json!({
        "partId": "0",
        "mimeType": "text/plain",
        "filename": "",
        "body": {"size": 2, "data": "aGk"}
    })];
    for (i, (filename, attachment_id)) in attachments.iter().enumerate() {
        parts.push(serde_json::json!({
            "partId": (i + 1).to_string(),
            "mimeType": "application/octet-stream",
            "filename": filename,
            "body": {"attachmentId": attachment_id, "size": 5}
        }));
    }
    serde_json::json!({
        "id": id,
        "threadId": id,
        "payload": {"mimeType": "multipart/mixed", "filename": "", "parts": parts}
    })
    .to_string()
}

fn read_entry(bytes: &[u8], name: &str) -> Vec<u8> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut out = Vec::new();
    archive.by_name(name).unwrap().read_to_end(&mut out).unwrap();
    out
}

#[tokio::test]
async fn search_download_and_pack_to_disk() {
    let server = gmail_server::start(vec![
        (
            LIST,
            vec![ok(r#"{"messages":[{"id":"m1","threadId":"m1"},{"id":"m2","threadId":"m2"}]}"#)],
        ),
        (
            "/gmail/v1/users/me/messages/m1",
            vec![ok(&message_json("m1", &[("report.pdf", "a1")]))],
        ),
        (
            "/gmail/v1/users/me/messages/m2",
            vec![ok(&message_json("m2", &[("report.pdf", "a2")]))],
        ),
        (
            "/gmail/v1/users/me/messages/m1/attachments/a1",
            // "hello"
            vec![ok(r#"{"size":5,"data":"aGVsbG8"}"#)],
        ),
        (
            "/gmail/v1/users/me/messages/m2/attachments/a2",
            // "world"
            vec![ok(r#"{"size":5,"data":"d29ybGQ="}"#)],
        ),
    ]);
    let client = GmailClient::new(server.api_base(), "me", "tok-123");

    let collected = collect_attachments(
        &client,
        &fast_policy(3),
        "has:attachment",
        &CollectOptions::default(),
        None,
    )
    .await
    .unwrap();
    assert_eq!(collected.report.attachments_downloaded, 2);
    assert_eq!(collected.report.total_bytes, 10);

    let bytes = build_archive(collected.entries).unwrap();
    let dir = tempdir().unwrap();
    let path = dir.path().join("out").join("attachments.zip");
    let written = write_archive(&path, &bytes, false).unwrap();
    assert_eq!(written.size, bytes.len() as u64);
    assert_eq!(written.sha256, checksum::sha256_path(&path).unwrap());

    let on_disk = std::fs::read(&path).unwrap();
    assert_eq!(read_entry(&on_disk, "report.pdf"), b"hello");
    assert_eq!(read_entry(&on_disk, "report_1.pdf"), b"world");

    let requests = server.requests();
    let list = requests.iter().find(|r| r.path() == LIST).unwrap();
    assert_eq!(list.method, "GET");
    assert!(list.target.contains("q=has%3Aattachment"));
    assert!(requests
        .iter()
        .all(|r| r.headers.iter().any(|h| h == "authorization: bearer tok-123")));
}

#[tokio::test]
async fn server_error_is_retried_then_succeeds() {
    let attachment = "/gmail/v1/users/me/messages/m1/attachments/a1";
    let server = gmail_server::start(vec![
        (LIST, vec![ok(r#"{"messages":[{"id":"m1"}]}"#)]),
        (
            "/gmail/v1/users/me/messages/m1",
            vec![ok(&message_json("m1", &[("a.bin", "a1")]))],
        ),
        (
            attachment,
            vec![google_error(500, "Backend Error"), ok(r#"{"data":"AQID"}"#)],
        ),
    ]);
    let client = GmailClient::new(server.api_base(), "me", "tok");

    let collected = collect_attachments(&client, &fast_policy(3), "q", &CollectOptions::default(), None)
        .await
        .unwrap();
    assert_eq!(collected.entries[0].payload, vec![1, 2, 3]);
    assert_eq!(server.hits(attachment), 2);
}

#[tokio::test]
async fn persistent_throttling_exhausts_retries() {
    let server = gmail_server::start(vec![(
        LIST,
        vec![google_error(429, "Rate Limit Exceeded")],
    )]);
    let client = GmailClient::new(server.api_base(), "me", "tok");

    let err = search(&client, &fast_policy(2), "q", None, 100)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), RetryErrorKind::RetriesExhausted);
    assert_eq!(
        err.to_string(),
        "Searching messages: Failed after 2 attempts - Rate Limit Exceeded"
    );
    assert_eq!(server.hits(LIST), 2);
}

#[tokio::test]
async fn deleted_message_is_skipped() {
    let server = gmail_server::start(vec![
        (
            LIST,
            vec![ok(r#"{"messages":[{"id":"gone"},{"id":"m1"}]}"#)],
        ),
        (
            "/gmail/v1/users/me/messages/m1",
            vec![ok(&message_json("m1", &[("keep.txt", "k1")]))],
        ),
        (
            "/gmail/v1/users/me/messages/m1/attachments/k1",
            vec![ok(r#"{"data":"aGk"}"#)],
        ),
    ]);
    let client = GmailClient::new(server.api_base(), "me", "tok");

    let collected = collect_attachments(&client, &fast_policy(3), "q", &CollectOptions::default(), None)
        .await
        .unwrap();
    assert_eq!(collected.report.messages_skipped, 1);
    assert_eq!(collected.entries.len(), 1);
    assert_eq!(collected.entries[0].name, "keep.txt");
    // not retried
    assert_eq!(server.hits("/gmail/v1/users/me/messages/gone"), 1);
}

#[tokio::test]
async fn bad_query_is_not_retried() {
    let server = gmail_server::start(vec![(
        LIST,
        vec![google_error(400, "Invalid value for q")],
    )]);
    let client = GmailClient::new(server.api_base(), "me", "tok");

    let err = collect_attachments(&client, &fast_policy(3), "from:", &CollectOptions::default(), None)
        .await
        .unwrap_err();
    let retry = err.downcast_ref::<RetryError>().unwrap();
    assert_eq!(retry.kind(), RetryErrorKind::InvalidRequest);
    assert_eq!(
        err.to_string(),
        "Searching messages: Invalid request - Invalid value for q"
    );
    assert_eq!(server.hits(LIST), 1);
}

#[tokio::test]
async fn expired_token_is_refreshed_and_saved() {
    let server = gmail_server::start(vec![(
        "/token",
        vec![ok(r#"{"access_token":"fresh","expires_in":3600,"token_type":"Bearer"}"#)],
    )]);
    let secrets = ClientSecrets::from_json(&format!(
        r#"{{"installed": {{"client_id": "cid", "client_secret": "shh", "token_uri": "{}/token"}}}}"#,
        server.base
    ))
    .unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("token.json");
    StoredToken {
        access_token: "stale".into(),
        refresh_token: Some("r-1".into()),
        expires_at: unix_now() + 10,
        scope: None,
        token_type: "Bearer".into(),
    }
    .save(&path)
    .unwrap();

    let token = ensure_fresh(&secrets, &path, &fast_policy(3)).await.unwrap();
    assert_eq!(token.access_token, "fresh");
    assert_eq!(token.refresh_token.as_deref(), Some("r-1"));
    assert!(token.expires_at >= unix_now() + 3500);
    assert_eq!(StoredToken::load(&path).unwrap(), Some(token));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert!(requests[0].body.contains("grant_type=refresh_token"));
    assert!(requests[0].body.contains("refresh_token=r-1"));
}
