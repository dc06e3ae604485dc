use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Serialize, AsRefStr, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RelayStatus {
    Triggered,
    Ignored,
    Error,
}

/// Outcome of handling one request, returned to the caller as-is.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
pub struct RelayResult {
    pub status: RelayStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub commit_id: Option<String>,
}

impl RelayResult {
    pub fn triggered(message: impl Into<String>, commit_id: Option<String>) -> Self {
        Self {
            status: RelayStatus::Triggered,
            message: message.into(),
            commit_id,
        }
    }

    pub fn ignored(message: impl Into<String>) -> Self {
        Self {
            status: RelayStatus::Ignored,
            message: message.into(),
            commit_id: None,
        }
    }

    pub fn error(message: impl Into<String>, commit_id: Option<String>) -> Self {
        Self {
            status: RelayStatus::Error,
            message: message.into(),
            commit_id,
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.status == RelayStatus::Triggered
    }
}
