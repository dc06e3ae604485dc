use crate::{
    config::Config,
    forward_event::ForwardEvent,
    mock_forwarder::MockForwarder,
    relay,
    signature::SIGNATURE_HEADER,
    state::AppState,
    trigger_request::TriggerRequest,
    util::recent_events,
};
use anyhow::{anyhow, Result};
use axum::{
    body::Bytes,
    debug_handler,
    extract::State,
    http::{HeaderMap, HeaderName, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_prometheus::{metrics_exporter_prometheus::PrometheusHandle, PrometheusMetricLayer};
use chrono::Utc;
use deployrelay_domain::{ApplicationError, InboundEvent, RelayError, RelayResult, RelayStatus};
use serde_json::{json, Value};
use std::{
    iter::once,
    sync::{Arc, OnceLock},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    sensitive_headers::SetSensitiveRequestHeadersLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

pub const SERVICE_NAME: &str = "deployrelay-gateway";

const NO_JSON_ERROR: &str = "No JSON data received";
const INVALID_SIGNATURE_ERROR: &str = "Invalid signature";

// The exporter installs a process-wide recorder, so every router shares one.
static METRICS: OnceLock<(PrometheusMetricLayer<'static>, PrometheusHandle)> = OnceLock::new();

#[derive(Clone)]
pub struct Server {
    config: Config,
    forwarder: Arc<dyn ForwardEvent + Sync + Send>,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            config: Config::default(),
            forwarder: Arc::new(MockForwarder::default()),
        }
    }
}

impl Server {
    pub fn new(config: Config, forwarder: Arc<dyn ForwardEvent + Sync + Send>) -> Self {
        Self { config, forwarder }
    }

    pub async fn run(&self) -> Result<()> {
        let app = self.get_router();
        info!("Relay server listening on {}", self.config.address());

        let tcp_listener = TcpListener::bind(self.config.address())
            .await
            .map_err(|e| anyhow!("Failed to bind to address: {}", e))?;

        axum::serve(tcp_listener, app.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| anyhow!("Server error: {}", e))
    }

    pub fn get_router(&self) -> Router {
        let state = Arc::new(AppState::new(self.config.clone(), self.forwarder.clone()));
        if !state.verifier.is_enabled() {
            warn!("No webhook secret configured, webhook signatures are not checked");
        }

        let mut router = Router::new()
            .route("/webhook/gitlab", post(gitlab_webhook))
            .route("/trigger/deployment", post(trigger_deployment))
            .layer(SetSensitiveRequestHeadersLayer::new(once(
                HeaderName::from_static(SIGNATURE_HEADER),
            )))
            .layer(TraceLayer::new_for_http())
            .route("/health", get(health))
            .route("/status", get(status))
            .fallback(not_found_handler)
            .layer(CorsLayer::new().allow_origin(Any))
            .with_state(state);

        if self.config.metrics_enabled {
            let (prometheus_layer, metric_handle) =
                METRICS.get_or_init(PrometheusMetricLayer::pair).clone();
            router = router
                .route("/metrics", get(|| async move { metric_handle.render() }))
                .layer(prometheus_layer);
        }
        router
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down..."),
        Err(e) => {
            error!("Could not listen for shutdown signal: {e}");
            std::future::pending::<()>().await;
        }
    }
}

/// Webhook and trigger bodies must be a non-empty JSON object.
fn parse_json_body(body: &[u8]) -> Result<Value, RelayError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) if !map.is_empty() => Ok(Value::Object(map)),
        Ok(_) => Err(ApplicationError::bad_request(NO_JSON_ERROR, None)),
        Err(e) => {
            warn!("Failed to deserialize payload: {e}");
            Err(ApplicationError::bad_request(NO_JSON_ERROR, None))
        }
    }
}

#[debug_handler]
async fn gitlab_webhook(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<RelayResult>, RelayError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !state.verifier.verify(&body, signature) {
        warn!("Invalid webhook signature");
        return Err(ApplicationError::unauthorized(INVALID_SIGNATURE_ERROR, None));
    }

    let event = InboundEvent::from_value(parse_json_body(&body)?)?;

    Ok(Json(
        relay::handle_event(event, state.forwarder.as_ref()).await,
    ))
}

#[debug_handler]
async fn trigger_deployment(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<RelayResult>), RelayError> {
    let request = serde_json::from_value::<TriggerRequest>(parse_json_body(&body)?).map_err(|e| {
        warn!("Failed to deserialize trigger request: {e}");
        ApplicationError::bad_request("Malformed trigger request", None)
    })?;

    let result = relay::handle_trigger(request, state.forwarder.as_ref()).await;
    let status = match result.status {
        RelayStatus::Error => StatusCode::INTERNAL_SERVER_ERROR,
        RelayStatus::Triggered | RelayStatus::Ignored => StatusCode::OK,
    };

    Ok((status, Json(result)))
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now(),
        "service": SERVICE_NAME,
    }))
}

async fn status(State(state): State<Arc<AppState>>) -> Result<Json<Value>, RelayError> {
    let recent_events = recent_events(&state.config.log_file).await?;

    Ok(Json(json!({
        "status": "running",
        "timestamp": Utc::now(),
        "recent_events": recent_events,
        "configuration": {
            "gitlab_token_configured": state.config.gitlab_token().is_some(),
            "github_token_configured": state.config.github_token().is_some(),
            "webhook_secret_configured": state.config.webhook_secret().is_some(),
        }
    })))
}

async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}
