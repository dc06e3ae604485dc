use deployrelay_domain::{InternalError, RelayError};
use envconfig::Envconfig;
use std::{
    fmt::{Display, Formatter},
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

#[derive(Envconfig, Clone)] // Intentionally no Debug so secrets are not printed
pub struct Config {
    #[envconfig(from = "HOST", default = "0.0.0.0")]
    pub host: IpAddr,
    #[envconfig(from = "PORT", default = "5000")]
    pub port: u16,
    #[envconfig(from = "DEBUG", default = "false")]
    pub debug: bool,
    #[envconfig(from = "GITLAB_WEBHOOK_SECRET")]
    pub webhook_secret: Option<String>,
    #[envconfig(from = "REQUIRE_WEBHOOK_SECRET", default = "false")]
    pub require_webhook_secret: bool,
    #[envconfig(from = "GITHUB_TOKEN")]
    pub github_token: Option<String>,
    #[envconfig(from = "GITLAB_TOKEN")]
    pub gitlab_token: Option<String>,
    #[envconfig(from = "INFRA_REPO_OWNER", default = "peacefulrobot")]
    pub infra_repo_owner: String,
    #[envconfig(from = "INFRA_REPO_NAME", default = "peacefulrobot-infra")]
    pub infra_repo_name: String,
    #[envconfig(from = "GITLAB_PROJECT_ID")]
    pub gitlab_project_id: Option<String>,
    #[envconfig(from = "GITHUB_API_URL", default = "https://api.github.com")]
    pub github_api_url: String,
    #[envconfig(from = "GITLAB_API_URL", default = "https://gitlab.com/api/v4")]
    pub gitlab_api_url: String,
    #[envconfig(from = "HTTP_CLIENT_TIMEOUT_SECS", default = "30")]
    pub http_client_timeout_secs: u64,
    #[envconfig(from = "LOG_FILE", default = "webhook.log")]
    pub log_file: PathBuf,
    #[envconfig(from = "METRICS_ENABLED", default = "true")]
    pub metrics_enabled: bool,
}

/// Empty values count as unset, matching how the variables are usually
/// blanked out in `.env` files.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn webhook_secret(&self) -> Option<&str> {
        non_empty(&self.webhook_secret)
    }

    pub fn github_token(&self) -> Option<&str> {
        non_empty(&self.github_token)
    }

    pub fn gitlab_token(&self) -> Option<&str> {
        non_empty(&self.gitlab_token)
    }

    pub fn gitlab_project_id(&self) -> Option<&str> {
        non_empty(&self.gitlab_project_id)
    }

    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }

    pub fn validate(&self) -> Result<(), RelayError> {
        if self.require_webhook_secret && self.webhook_secret().is_none() {
            return Err(InternalError::configuration_error(
                "REQUIRE_WEBHOOK_SECRET is set but GITLAB_WEBHOOK_SECRET is empty",
                Some("webhook_secret"),
            ));
        }
        Ok(())
    }
}

fn flag(value: Option<&str>) -> &'static str {
    if value.is_some() {
        "****"
    } else {
        "<unset>"
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SERVER_ADDRESS: {}", self.address())?;
        writeln!(f, "DEBUG: {}", self.debug)?;
        writeln!(f, "GITLAB_WEBHOOK_SECRET: {}", flag(self.webhook_secret()))?;
        writeln!(f, "REQUIRE_WEBHOOK_SECRET: {}", self.require_webhook_secret)?;
        writeln!(f, "GITHUB_TOKEN: {}", flag(self.github_token()))?;
        writeln!(f, "GITLAB_TOKEN: {}", flag(self.gitlab_token()))?;
        writeln!(f, "INFRA_REPO_OWNER: {}", self.infra_repo_owner)?;
        writeln!(f, "INFRA_REPO_NAME: {}", self.infra_repo_name)?;
        writeln!(f, "GITLAB_PROJECT_ID: {:?}", self.gitlab_project_id())?;
        writeln!(f, "GITHUB_API_URL: {}", self.github_api_url)?;
        writeln!(f, "GITLAB_API_URL: {}", self.gitlab_api_url)?;
        writeln!(
            f,
            "HTTP_CLIENT_TIMEOUT_SECS: {}",
            self.http_client_timeout_secs
        )?;
        writeln!(f, "LOG_FILE: {}", self.log_file.display())?;
        writeln!(f, "METRICS_ENABLED: {}", self.metrics_enabled)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5000,
            debug: false,
            webhook_secret: None,
            require_webhook_secret: false,
            github_token: None,
            gitlab_token: None,
            infra_repo_owner: "peacefulrobot".to_owned(),
            infra_repo_name: "peacefulrobot-infra".to_owned(),
            gitlab_project_id: None,
            github_api_url: "https://api.github.com".to_owned(),
            gitlab_api_url: "https://gitlab.com/api/v4".to_owned(),
            http_client_timeout_secs: 30,
            log_file: PathBuf::from("webhook.log"),
            metrics_enabled: true,
        }
    }
}
