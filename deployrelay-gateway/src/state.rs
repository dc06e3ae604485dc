use super::forward_event::ForwardEvent;
use crate::{config::Config, signature::SignatureVerifier};
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub verifier: SignatureVerifier,
    pub forwarder: Arc<dyn ForwardEvent + Sync + Send>,
}

impl AppState {
    pub fn new(config: Config, forwarder: Arc<dyn ForwardEvent + Sync + Send>) -> Self {
        let verifier = SignatureVerifier::new(config.webhook_secret());
        Self {
            config,
            verifier,
            forwarder,
        }
    }
}
