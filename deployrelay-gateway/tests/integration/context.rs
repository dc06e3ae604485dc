use deployrelay_gateway::{
    config::Config, forwarder::Forwarder, server::Server, signature::SIGNATURE_HEADER,
    signature::SignatureVerifier,
};
use envconfig::Envconfig;
use http::{header::CONTENT_TYPE, Method, StatusCode};
use mockito::{Server as MockServer, ServerGuard};
use serde_json::Value;
use std::{collections::HashMap, sync::Arc, sync::OnceLock, time::Duration};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

pub const WEBHOOK_SECRET: &str = "integration-secret";
pub const GITHUB_TOKEN: &str = "ghp_integration";
pub const GITLAB_TOKEN: &str = "glpat-integration";
pub const GITLAB_PROJECT_ID: &str = "4242";
pub const DISPATCH_PATH: &str = "/repos/peacefulrobot/peacefulrobot-infra/dispatches";
pub const TRIGGER_PATH: &str = "/projects/4242/trigger/pipeline";

static TRACING: OnceLock<()> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub client: reqwest::Client,
    pub mock_server: ServerGuard,
    pub verifier: SignatureVerifier,
    _log_dir: TempDir,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ApiResponse {
    pub code: StatusCode,
    pub data: Value,
}

/// Config pointing both upstream APIs at `mock_uri`.
pub fn test_config(mock_uri: &str, port: u16, log_dir: &TempDir) -> Config {
    let config = vec![
        ("HOST".to_string(), "127.0.0.1".to_string()),
        ("PORT".to_string(), port.to_string()),
        ("GITLAB_WEBHOOK_SECRET".to_string(), WEBHOOK_SECRET.to_string()),
        ("GITHUB_TOKEN".to_string(), GITHUB_TOKEN.to_string()),
        ("GITLAB_TOKEN".to_string(), GITLAB_TOKEN.to_string()),
        ("GITLAB_PROJECT_ID".to_string(), GITLAB_PROJECT_ID.to_string()),
        ("GITHUB_API_URL".to_string(), mock_uri.to_string()),
        ("GITLAB_API_URL".to_string(), mock_uri.to_string()),
        ("HTTP_CLIENT_TIMEOUT_SECS".to_string(), "5".to_string()),
        (
            "LOG_FILE".to_string(),
            log_dir.path().join("webhook.log").display().to_string(),
        ),
        ("METRICS_ENABLED".to_string(), "false".to_string()),
    ];

    Config::init_from_hashmap(&HashMap::from_iter(config)).expect("Failed to initialize config")
}

impl TestServer {
    pub async fn new() -> Self {
        TRACING.get_or_init(|| {
            let filter = EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy();

            tracing_subscriber::fmt().with_env_filter(filter).init();
        });

        let port = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to port")
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let mock_server = MockServer::new_async().await;
        let log_dir = TempDir::new().expect("Failed to create log directory");
        let config = test_config(&mock_server.url(), port, &log_dir);

        let forwarder = Forwarder::new(&config).expect("Failed to create forwarder");
        let server = Server::new(config, Arc::new(forwarder));

        tokio::task::spawn(async move { server.run().await });

        tokio::time::sleep(Duration::from_millis(200)).await;

        Self {
            port,
            client: reqwest::Client::new(),
            mock_server,
            verifier: SignatureVerifier::new(Some(WEBHOOK_SECRET)),
            _log_dir: log_dir,
        }
    }

    pub async fn send_request(
        &self,
        path: &str,
        method: Method,
        body: Option<&Value>,
        signed: bool,
    ) -> ApiResponse {
        let uri = format!("http://127.0.0.1:{}/{path}", self.port);
        let mut req = self.client.request(method, uri);

        if let Some(body) = body {
            let bytes = serde_json::to_vec(body).expect("Failed to serialize body");
            if signed {
                let signature = self.verifier.sign(&bytes).expect("Secret is configured");
                req = req.header(SIGNATURE_HEADER, signature);
            }
            req = req.header(CONTENT_TYPE, "application/json").body(bytes);
        }

        let res = req.send().await.expect("Failed to send request");
        let code = res.status();
        let data = res.json().await.expect("Failed to deserialize response");

        ApiResponse { code, data }
    }
}
