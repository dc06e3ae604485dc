use crate::context::{test_config, DISPATCH_PATH, GITHUB_TOKEN, GITLAB_TOKEN, TRIGGER_PATH};
use chrono::{TimeZone, Utc};
use deployrelay_domain::{DispatchEventType, DispatchPayload};
use deployrelay_gateway::{forward_event::ForwardEvent, forwarder::Forwarder};
use mockito::{Matcher, Server as MockServer};
use serde_json::json;
use tempfile::TempDir;

fn payload() -> DispatchPayload {
    DispatchPayload {
        event_type: DispatchEventType::ContentUpdated,
        source: "gitlab_push".to_owned(),
        commit_id: Some("abc123".to_owned()),
        commit_message: Some("fix typo".to_owned()),
        author: Some("Ada".to_owned()),
        status: None,
        branch: "refs/heads/main".to_owned(),
        timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    }
}

async fn forwarder(mock_uri: &str) -> (Forwarder, TempDir) {
    let log_dir = TempDir::new().unwrap();
    let config = test_config(mock_uri, 0, &log_dir);
    (Forwarder::new(&config).unwrap(), log_dir)
}

#[tokio::test]
async fn test_github_dispatch_accepted() {
    let mut server = MockServer::new_async().await;
    let mock = server
        .mock("POST", DISPATCH_PATH)
        .match_header("authorization", format!("Bearer {GITHUB_TOKEN}").as_str())
        .match_header("accept", "application/vnd.github.v3+json")
        .match_header("user-agent", Matcher::Regex("^deployrelay-gateway/".to_owned()))
        .match_body(Matcher::PartialJson(json!({
            "event_type": "content_updated",
            "client_payload": {
                "commit_id": "abc123",
                "author": "Ada",
                "branch": "refs/heads/main"
            }
        })))
        .with_status(204)
        .create_async()
        .await;

    let (forwarder, _log_dir) = forwarder(&server.url()).await;
    assert!(forwarder.dispatch_github(&payload()).await.is_ok());

    mock.assert_async().await;
}

#[tokio::test]
async fn test_github_dispatch_rejected() {
    let mut server = MockServer::new_async().await;
    for status in [200, 401, 422, 500] {
        let mock = server
            .mock("POST", DISPATCH_PATH)
            .with_status(status)
            .with_body(r#"{"message":"nope"}"#)
            .create_async()
            .await;

        let (forwarder, _log_dir) = forwarder(&server.url()).await;
        let error = forwarder.dispatch_github(&payload()).await.unwrap_err();
        assert!(error.is_internal(), "{status}");

        mock.assert_async().await;
        mock.remove_async().await;
    }
}

#[tokio::test]
async fn test_gitlab_trigger_returns_pipeline_id() {
    let mut server = MockServer::new_async().await;
    let mock = server
        .mock("POST", TRIGGER_PATH)
        .match_header("private-token", GITLAB_TOKEN)
        .match_body(Matcher::PartialJson(json!({
            "ref": "main",
            "variables": {
                "WEBHOOK_EVENT": "content_updated",
                "DEPLOYMENT_SOURCE": "github_actions",
                "SYNC_COMMIT": "abc123",
                "TIMESTAMP": "2024-05-01T12:00:00+00:00"
            }
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 987, "status": "created"}"#)
        .create_async()
        .await;

    let (forwarder, _log_dir) = forwarder(&server.url()).await;
    assert_eq!(forwarder.trigger_gitlab(&payload()).await.unwrap(), Some(987));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_gitlab_trigger_without_id_is_still_success() {
    let mut server = MockServer::new_async().await;
    let mock = server
        .mock("POST", TRIGGER_PATH)
        .with_status(201)
        .with_body("created")
        .create_async()
        .await;

    let (forwarder, _log_dir) = forwarder(&server.url()).await;
    assert_eq!(forwarder.trigger_gitlab(&payload()).await.unwrap(), None);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_gitlab_trigger_rejected() {
    let mut server = MockServer::new_async().await;
    let mock = server
        .mock("POST", TRIGGER_PATH)
        .with_status(200)
        .with_body(r#"{"id": 1}"#)
        .create_async()
        .await;

    let (forwarder, _log_dir) = forwarder(&server.url()).await;
    assert!(forwarder.trigger_gitlab(&payload()).await.is_err());

    mock.assert_async().await;
}
