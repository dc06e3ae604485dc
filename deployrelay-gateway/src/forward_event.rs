use async_trait::async_trait;
use deployrelay_domain::{DispatchPayload, RelayError};

/// Outbound side of the relay. Each call is a single attempt.
#[async_trait]
pub trait ForwardEvent {
    /// Sends a repository dispatch to the infrastructure repository on GitHub.
    async fn dispatch_github(&self, payload: &DispatchPayload) -> Result<(), RelayError>;

    /// Starts a pipeline on the GitLab project, returning its id when GitLab
    /// reports one.
    async fn trigger_gitlab(&self, payload: &DispatchPayload) -> Result<Option<u64>, RelayError>;
}
