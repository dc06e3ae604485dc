use crate::{forward_event::ForwardEvent, trigger_request::TriggerRequest};
use deployrelay_domain::{DispatchPayload, InboundEvent, PipelineEvent, PushEvent, RelayResult};
use tracing::{error, info};

pub type DynForwarder = dyn ForwardEvent + Sync + Send;

/// Classifies one webhook event and forwards it when it is actionable.
pub async fn handle_event(event: InboundEvent, forwarder: &DynForwarder) -> RelayResult {
    info!("Received GitLab webhook: {}", event.kind());

    match event {
        InboundEvent::Push(push) => handle_push(push, forwarder).await,
        InboundEvent::Pipeline(pipeline) => handle_pipeline(pipeline, forwarder).await,
        InboundEvent::Other(kind) => {
            info!("Unhandled GitLab event type: {kind}");
            RelayResult::ignored(format!("Event type {kind} not handled"))
        }
    }
}

async fn handle_push(push: PushEvent, forwarder: &DynForwarder) -> RelayResult {
    info!("Push to {} with {} commits", push.r#ref, push.commits.len());

    if !push.is_main_branch() {
        info!("Ignoring push to branch {}", push.r#ref);
        return RelayResult::ignored(format!("Not main branch: {}", push.r#ref));
    }

    let commit = push.latest_commit();
    let payload = DispatchPayload::content_updated(&push, &commit);

    match forwarder.dispatch_github(&payload).await {
        Ok(()) => {
            info!("Successfully triggered deployment for commit {}", commit.id);
            RelayResult::triggered("Deployment triggered successfully", Some(commit.id))
        }
        Err(e) => {
            error!("Failed to trigger deployment for commit {}: {e}", commit.id);
            RelayResult::error("Failed to trigger deployment", Some(commit.id))
        }
    }
}

async fn handle_pipeline(pipeline: PipelineEvent, forwarder: &DynForwarder) -> RelayResult {
    let attributes = &pipeline.object_attributes;
    info!("Pipeline {} on {}", attributes.status, attributes.r#ref);

    if !pipeline.should_notify() {
        return RelayResult::ignored(format!(
            "Pipeline status {} not handled",
            attributes.status
        ));
    }

    let payload = DispatchPayload::deployment_completed(&pipeline);
    match forwarder.dispatch_github(&payload).await {
        Ok(()) => {
            info!("Notified GitHub about pipeline {}", attributes.status);
            RelayResult::triggered("GitHub notified", payload.commit_id)
        }
        Err(e) => {
            error!("Failed to notify GitHub: {e}");
            RelayResult::error("Failed to notify GitHub", payload.commit_id)
        }
    }
}

/// Forwards a manual trigger to GitLab when GitHub Actions asked for it, and
/// to GitHub otherwise.
pub async fn handle_trigger(request: TriggerRequest, forwarder: &DynForwarder) -> RelayResult {
    let targets_gitlab = request.targets_gitlab();
    let payload = request.into_payload();
    let event_type = payload.event_type.clone();

    let outcome = if targets_gitlab {
        forwarder.trigger_gitlab(&payload).await.map(|pipeline_id| {
            info!("Manual trigger started GitLab pipeline {pipeline_id:?}");
        })
    } else {
        forwarder.dispatch_github(&payload).await
    };

    match outcome {
        Ok(()) => RelayResult::triggered(
            format!("Deployment triggered: {event_type}"),
            payload.commit_id,
        ),
        Err(e) => {
            error!("Failed to trigger deployment {event_type}: {e}");
            RelayResult::error(
                format!("Failed to trigger deployment: {event_type}"),
                payload.commit_id,
            )
        }
    }
}
