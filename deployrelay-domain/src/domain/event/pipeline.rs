use super::null_as_default;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const MAIN_BRANCH: &str = "main";

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum PipelineStatus {
    Success,
    Failed,
    /// Running, pending, canceled and anything else GitLab reports.
    Other(String),
    #[default]
    Unknown,
}

impl PipelineStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PipelineStatus::Success => "success",
            PipelineStatus::Failed => "failed",
            PipelineStatus::Other(status) => status,
            PipelineStatus::Unknown => "",
        }
    }
}

impl From<String> for PipelineStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "success" => PipelineStatus::Success,
            "failed" => PipelineStatus::Failed,
            "" => PipelineStatus::Unknown,
            _ => PipelineStatus::Other(status),
        }
    }
}

impl From<PipelineStatus> for String {
    fn from(status: PipelineStatus) -> Self {
        status.as_str().to_owned()
    }
}

impl Display for PipelineStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PipelineAttributes {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: PipelineStatus,
    /// Bare branch name, e.g. `main`, unlike the `refs/heads/...` form of pushes.
    #[serde(default, deserialize_with = "null_as_default")]
    pub r#ref: String,
    #[serde(default)]
    pub sha: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PipelineEvent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub object_attributes: PipelineAttributes,
}

impl PipelineEvent {
    /// Successful pipelines on `main` and failed pipelines on any branch are
    /// reported back; everything else is dropped.
    pub fn should_notify(&self) -> bool {
        let attributes = &self.object_attributes;
        match attributes.status {
            PipelineStatus::Success => attributes.r#ref == MAIN_BRANCH,
            PipelineStatus::Failed => true,
            PipelineStatus::Other(_) | PipelineStatus::Unknown => false,
        }
    }
}
