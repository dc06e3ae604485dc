use crate::{config::Config, forward_event::ForwardEvent};
use anyhow::{Context, Result};
use async_trait::async_trait;
use deployrelay_domain::{DispatchPayload, InternalError, RelayError};
use http::{
    header::{ACCEPT, CONTENT_TYPE},
    StatusCode,
};
use reqwest_middleware::{reqwest, ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{error, info};

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const GITLAB_TOKEN_HEADER: &str = "PRIVATE-TOKEN";
const GITLAB_TRIGGER_REF: &str = "main";
const GITLAB_DEPLOYMENT_SOURCE: &str = "github_actions";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Body of a GitHub `repository_dispatch` request.
pub fn github_dispatch_body(payload: &DispatchPayload) -> Value {
    json!({
        "event_type": payload.event_type,
        "client_payload": payload,
    })
}

/// Body of a GitLab pipeline trigger request.
pub fn gitlab_trigger_body(payload: &DispatchPayload) -> Value {
    json!({
        "ref": GITLAB_TRIGGER_REF,
        "variables": {
            "WEBHOOK_EVENT": payload.event_type,
            "DEPLOYMENT_SOURCE": GITLAB_DEPLOYMENT_SOURCE,
            "SYNC_COMMIT": payload.commit_id.as_deref().unwrap_or_default(),
            "TIMESTAMP": payload.timestamp.to_rfc3339(),
        }
    })
}

fn encode(body: &Value, target: &str) -> Result<Vec<u8>, RelayError> {
    serde_json::to_vec(body).map_err(|e| {
        error!("Failed to serialize {target} request: {e}");
        InternalError::serialize_error(&e.to_string(), Some(target))
    })
}

pub struct Forwarder {
    client: ClientWithMiddleware,
    github_api_url: String,
    github_token: Option<String>,
    infra_repo_owner: String,
    infra_repo_name: String,
    gitlab_api_url: String,
    gitlab_token: Option<String>,
    gitlab_project_id: Option<String>,
}

impl Forwarder {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_client_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("Could not build HTTP client")?;
        let client = ClientBuilder::new(client)
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            client,
            github_api_url: config.github_api_url.trim_end_matches('/').to_owned(),
            github_token: config.github_token().map(str::to_owned),
            infra_repo_owner: config.infra_repo_owner.clone(),
            infra_repo_name: config.infra_repo_name.clone(),
            gitlab_api_url: config.gitlab_api_url.trim_end_matches('/').to_owned(),
            gitlab_token: config.gitlab_token().map(str::to_owned),
            gitlab_project_id: config.gitlab_project_id().map(str::to_owned),
        })
    }

    fn github_dispatch_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/dispatches",
            self.github_api_url, self.infra_repo_owner, self.infra_repo_name
        )
    }

    fn gitlab_trigger_url(&self, project_id: &str) -> String {
        format!(
            "{}/projects/{}/trigger/pipeline",
            self.gitlab_api_url, project_id
        )
    }
}

#[async_trait]
impl ForwardEvent for Forwarder {
    async fn dispatch_github(&self, payload: &DispatchPayload) -> Result<(), RelayError> {
        let Some(token) = self.github_token.as_deref() else {
            error!("Cannot trigger GitHub dispatch: GITHUB_TOKEN is not configured");
            return Err(InternalError::upstream(
                "GITHUB_TOKEN is not configured",
                Some("github"),
            ));
        };

        let body = encode(&github_dispatch_body(payload), "github")?;
        let response = self
            .client
            .post(self.github_dispatch_url())
            .bearer_auth(token)
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                error!("Error triggering GitHub dispatch: {e}");
                InternalError::upstream(&e.to_string(), Some("github"))
            })?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            info!(
                "Successfully triggered GitHub dispatch {}",
                payload.event_type
            );
            Ok(())
        } else {
            let text = response.text().await.unwrap_or_default();
            error!("Failed to trigger GitHub dispatch: {status} - {text}");
            Err(InternalError::upstream(
                &format!("GitHub responded with {status}"),
                Some("github"),
            ))
        }
    }

    async fn trigger_gitlab(&self, payload: &DispatchPayload) -> Result<Option<u64>, RelayError> {
        let (Some(token), Some(project_id)) = (
            self.gitlab_token.as_deref(),
            self.gitlab_project_id.as_deref(),
        ) else {
            error!("Cannot trigger GitLab pipeline: GITLAB_TOKEN or GITLAB_PROJECT_ID is not configured");
            return Err(InternalError::upstream(
                "GITLAB_TOKEN or GITLAB_PROJECT_ID is not configured",
                Some("gitlab"),
            ));
        };

        let body = encode(&gitlab_trigger_body(payload), "gitlab")?;
        let response = self
            .client
            .post(self.gitlab_trigger_url(project_id))
            .header(GITLAB_TOKEN_HEADER, token)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                error!("Error triggering GitLab pipeline: {e}");
                InternalError::upstream(&e.to_string(), Some("gitlab"))
            })?;

        let status = response.status();
        if status == StatusCode::CREATED {
            let pipeline_id = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body.get("id").and_then(Value::as_u64));
            info!("Successfully triggered GitLab pipeline {pipeline_id:?}");
            Ok(pipeline_id)
        } else {
            let text = response.text().await.unwrap_or_default();
            error!("Failed to trigger GitLab pipeline: {status} - {text}");
            Err(InternalError::upstream(
                &format!("GitLab responded with {status}"),
                Some("gitlab"),
            ))
        }
    }
}
