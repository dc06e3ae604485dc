use chrono::{DateTime, Utc};
use deployrelay_domain::{DispatchEventType, DispatchPayload, SOURCE_MANUAL};
use serde::{Deserialize, Serialize};

/// Callers that identify as GitHub Actions want a GitLab pipeline started.
pub const GITHUB_ACTIONS_SOURCE: &str = "github_actions";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TriggerRequest {
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub commit_id: Option<String>,
    #[serde(default)]
    pub commit_message: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl TriggerRequest {
    pub fn targets_gitlab(&self) -> bool {
        self.source.as_deref() == Some(GITHUB_ACTIONS_SOURCE)
    }

    pub fn event_type(&self) -> DispatchEventType {
        self.event_type
            .clone()
            .map(DispatchEventType::from)
            .unwrap_or_default()
    }

    pub fn into_payload(self) -> DispatchPayload {
        DispatchPayload {
            event_type: self.event_type(),
            source: self.source.unwrap_or_else(|| SOURCE_MANUAL.to_owned()),
            commit_id: self.commit_id,
            commit_message: self.commit_message,
            author: self.author,
            status: None,
            branch: self.branch.unwrap_or_else(|| "main".to_owned()),
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
        }
    }
}
