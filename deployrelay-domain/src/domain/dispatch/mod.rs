use crate::{Commit, PipelineEvent, PipelineStatus, PushEvent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const SOURCE_GITLAB_PUSH: &str = "gitlab_push";
pub const SOURCE_GITLAB_PIPELINE: &str = "gitlab_pipeline";
pub const SOURCE_MANUAL: &str = "manual";

/// The `event_type` tag a dispatch is sent under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum DispatchEventType {
    ContentUpdated,
    DeploymentCompleted,
    #[default]
    ManualTrigger,
    /// A tag chosen by a manual caller.
    Custom(String),
}

impl DispatchEventType {
    pub fn as_str(&self) -> &str {
        match self {
            DispatchEventType::ContentUpdated => "content_updated",
            DispatchEventType::DeploymentCompleted => "deployment_completed",
            DispatchEventType::ManualTrigger => "manual_trigger",
            DispatchEventType::Custom(tag) => tag,
        }
    }
}

impl From<String> for DispatchEventType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "content_updated" => DispatchEventType::ContentUpdated,
            "deployment_completed" => DispatchEventType::DeploymentCompleted,
            "manual_trigger" => DispatchEventType::ManualTrigger,
            _ => DispatchEventType::Custom(tag),
        }
    }
}

impl From<DispatchEventType> for String {
    fn from(event_type: DispatchEventType) -> Self {
        event_type.as_str().to_owned()
    }
}

impl Display for DispatchEventType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalized envelope sent to a target platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DispatchPayload {
    pub event_type: DispatchEventType,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub commit_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub commit_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<PipelineStatus>,
    pub branch: String,
    pub timestamp: DateTime<Utc>,
}

impl DispatchPayload {
    pub fn content_updated(push: &PushEvent, commit: &Commit) -> Self {
        Self {
            event_type: DispatchEventType::ContentUpdated,
            source: SOURCE_GITLAB_PUSH.to_owned(),
            commit_id: Some(commit.id.clone()),
            commit_message: Some(commit.message.clone()),
            author: Some(commit.author_name().to_owned()),
            status: None,
            branch: push.r#ref.clone(),
            timestamp: Utc::now(),
        }
    }

    pub fn deployment_completed(pipeline: &PipelineEvent) -> Self {
        let attributes = &pipeline.object_attributes;
        Self {
            event_type: DispatchEventType::DeploymentCompleted,
            source: SOURCE_GITLAB_PIPELINE.to_owned(),
            commit_id: attributes.sha.clone(),
            commit_message: None,
            author: None,
            status: Some(attributes.status.clone()),
            branch: attributes.r#ref.clone(),
            timestamp: Utc::now(),
        }
    }
}
