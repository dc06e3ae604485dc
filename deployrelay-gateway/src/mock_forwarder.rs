use super::forward_event::ForwardEvent;
use async_trait::async_trait;
use deployrelay_domain::{DispatchPayload, InternalError, RelayError};
use tokio::sync::Mutex;

/// In-process forwarder that records every payload instead of sending it.
#[derive(Default)]
pub struct MockForwarder {
    failing: bool,
    github: Mutex<Vec<DispatchPayload>>,
    gitlab: Mutex<Vec<DispatchPayload>>,
}

impl MockForwarder {
    /// A forwarder whose upstream always rejects the call.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub async fn github_dispatches(&self) -> Vec<DispatchPayload> {
        self.github.lock().await.clone()
    }

    pub async fn gitlab_triggers(&self) -> Vec<DispatchPayload> {
        self.gitlab.lock().await.clone()
    }
}

#[async_trait]
impl ForwardEvent for MockForwarder {
    async fn dispatch_github(&self, payload: &DispatchPayload) -> Result<(), RelayError> {
        self.github.lock().await.push(payload.clone());
        if self.failing {
            return Err(InternalError::upstream("mock upstream failure", Some("github")));
        }
        Ok(())
    }

    async fn trigger_gitlab(&self, payload: &DispatchPayload) -> Result<Option<u64>, RelayError> {
        self.gitlab.lock().await.push(payload.clone());
        if self.failing {
            return Err(InternalError::upstream("mock upstream failure", Some("gitlab")));
        }
        Ok(Some(1))
    }
}
