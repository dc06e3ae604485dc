pub mod pipeline;
pub mod push;

pub use pipeline::{PipelineAttributes, PipelineEvent, PipelineStatus};
pub use push::{Commit, CommitAuthor, PushEvent};

use crate::{ApplicationError, RelayError};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

pub const OBJECT_KIND_FIELD: &str = "object_kind";

/// GitLab sends `null` for fields it has no value for; treat those like
/// missing fields.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A GitLab webhook body, keyed by its `object_kind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Push(PushEvent),
    Pipeline(PipelineEvent),
    /// Any kind the relay does not act on, with the kind as received.
    Other(String),
}

impl InboundEvent {
    pub fn kind(&self) -> &str {
        match self {
            InboundEvent::Push(_) => "push",
            InboundEvent::Pipeline(_) => "pipeline",
            InboundEvent::Other(kind) => kind,
        }
    }

    pub fn from_value(value: Value) -> Result<Self, RelayError> {
        let kind = value
            .get(OBJECT_KIND_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();

        match kind.as_str() {
            "push" => serde_json::from_value::<PushEvent>(value)
                .map(InboundEvent::Push)
                .map_err(|e| {
                    warn!("Failed to deserialize push event: {e}");
                    ApplicationError::bad_request("Malformed push event", Some("push"))
                }),
            "pipeline" => serde_json::from_value::<PipelineEvent>(value)
                .map(InboundEvent::Pipeline)
                .map_err(|e| {
                    warn!("Failed to deserialize pipeline event: {e}");
                    ApplicationError::bad_request("Malformed pipeline event", Some("pipeline"))
                }),
            _ => Ok(InboundEvent::Other(kind)),
        }
    }
}
