use crate::context::{TestServer, DISPATCH_PATH, TRIGGER_PATH};
use http::{Method, StatusCode};
use mockito::Matcher;
use serde_json::json;

#[tokio::test]
async fn test_main_push_reaches_github() {
    let mut server = TestServer::new().await;
    let mock = server
        .mock_server
        .mock("POST", DISPATCH_PATH)
        .match_body(Matcher::PartialJson(json!({
            "event_type": "content_updated",
            "client_payload": {
                "commit_id": "abc123",
                "source": "gitlab_push"
            }
        })))
        .with_status(204)
        .create_async()
        .await;

    let push = json!({
        "object_kind": "push",
        "ref": "refs/heads/main",
        "commits": [{ "id": "abc123", "message": "fix typo", "author": { "name": "Ada" } }]
    });
    let res = server
        .send_request("webhook/gitlab", Method::POST, Some(&push), true)
        .await;

    assert_eq!(res.code, StatusCode::OK);
    assert_eq!(
        res.data,
        json!({
            "status": "triggered",
            "message": "Deployment triggered successfully",
            "commit_id": "abc123"
        })
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unsigned_webhook_never_reaches_github() {
    let mut server = TestServer::new().await;
    let mock = server
        .mock_server
        .mock("POST", DISPATCH_PATH)
        .expect(0)
        .create_async()
        .await;

    let push = json!({ "object_kind": "push", "ref": "refs/heads/main", "commits": [] });
    let res = server
        .send_request("webhook/gitlab", Method::POST, Some(&push), false)
        .await;

    assert_eq!(res.code, StatusCode::UNAUTHORIZED);
    assert_eq!(res.data, json!({ "error": "Invalid signature" }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_failed_pipeline_notifies_github() {
    let mut server = TestServer::new().await;
    let mock = server
        .mock_server
        .mock("POST", DISPATCH_PATH)
        .match_body(Matcher::PartialJson(json!({
            "event_type": "deployment_completed",
            "client_payload": { "status": "failed", "commit_id": "def456" }
        })))
        .with_status(204)
        .create_async()
        .await;

    let pipeline = json!({
        "object_kind": "pipeline",
        "object_attributes": { "status": "failed", "ref": "feature/x", "sha": "def456" }
    });
    let res = server
        .send_request("webhook/gitlab", Method::POST, Some(&pipeline), true)
        .await;

    assert_eq!(res.code, StatusCode::OK);
    assert_eq!(res.data["status"], "triggered");
    assert_eq!(res.data["message"], "GitHub notified");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_github_rejection_is_reported() {
    let mut server = TestServer::new().await;
    let mock = server
        .mock_server
        .mock("POST", DISPATCH_PATH)
        .with_status(422)
        .create_async()
        .await;

    let push = json!({
        "object_kind": "push",
        "ref": "refs/heads/main",
        "after": "fff000",
        "commits": []
    });
    let res = server
        .send_request("webhook/gitlab", Method::POST, Some(&push), true)
        .await;

    assert_eq!(res.code, StatusCode::OK);
    assert_eq!(
        res.data,
        json!({
            "status": "error",
            "message": "Failed to trigger deployment",
            "commit_id": "fff000"
        })
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_github_actions_trigger_starts_gitlab_pipeline() {
    let mut server = TestServer::new().await;
    let mock = server
        .mock_server
        .mock("POST", TRIGGER_PATH)
        .match_body(Matcher::PartialJson(json!({
            "ref": "main",
            "variables": { "WEBHOOK_EVENT": "infra_sync", "SYNC_COMMIT": "abc123" }
        })))
        .with_status(201)
        .with_body(r#"{"id": 55}"#)
        .create_async()
        .await;

    let request = json!({
        "source": "github_actions",
        "event_type": "infra_sync",
        "commit_id": "abc123"
    });
    let res = server
        .send_request("trigger/deployment", Method::POST, Some(&request), false)
        .await;

    assert_eq!(res.code, StatusCode::OK);
    assert_eq!(
        res.data,
        json!({
            "status": "triggered",
            "message": "Deployment triggered: infra_sync",
            "commit_id": "abc123"
        })
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_failed_manual_trigger_is_server_error() {
    let mut server = TestServer::new().await;
    let mock = server
        .mock_server
        .mock("POST", DISPATCH_PATH)
        .with_status(500)
        .create_async()
        .await;

    let res = server
        .send_request("trigger/deployment", Method::POST, Some(&json!({ "source": "cron" })), false)
        .await;

    assert_eq!(res.code, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.data["status"], "error");
    assert_eq!(
        res.data["message"],
        "Failed to trigger deployment: manual_trigger"
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_status_reports_configuration() {
    let server = TestServer::new().await;

    let res = server.send_request("status", Method::GET, None, false).await;

    assert_eq!(res.code, StatusCode::OK);
    assert_eq!(res.data["status"], "running");
    assert_eq!(res.data["recent_events"], json!([]));
    assert_eq!(
        res.data["configuration"],
        json!({
            "gitlab_token_configured": true,
            "github_token_configured": true,
            "webhook_secret_configured": true
        })
    );
}
