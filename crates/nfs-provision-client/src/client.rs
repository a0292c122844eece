//! HTTP command runner for the cluster control plane.

use crate::config::RateLimitConfig;
use async_trait::async_trait;
use governor::DefaultDirectRateLimiter;
use nfs_provision_core::{CommandOutput, CommandRunner, MonCommand, ProvisionError, Result};
use reqwest::Client as HttpClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Path of the command endpoint, relative to the base URL
const REQUEST_PATH: &str = "request";

/// Runs control-plane commands against a REST command endpoint
///
/// Each command is `POST`ed as JSON to `<base_url>/request?wait=1`; the
/// endpoint answers with `{"status": int, "outb": str, "outs": str}`.
#[derive(Clone)]
pub struct RestfulClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    request_url: Url,
    credentials: Option<(String, String)>,
    timeout: Duration,
    rate_limiter: Option<DefaultDirectRateLimiter>,
}

impl RestfulClient {
    /// Create a client with default settings
    pub fn new(base_url: &str) -> Result<Self> {
        RestfulClientBuilder::new(base_url).build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder(base_url: impl Into<String>) -> RestfulClientBuilder {
        RestfulClientBuilder::new(base_url)
    }

    /// URL commands are posted to
    #[must_use]
    pub fn request_url(&self) -> &Url {
        &self.inner.request_url
    }

    fn map_transport_error(&self, err: &reqwest::Error) -> ProvisionError {
        if err.is_timeout() {
            ProvisionError::Timeout(self.inner.timeout.as_secs())
        } else {
            ProvisionError::Http(err.to_string())
        }
    }

    /// Convert a non-success HTTP response into an error
    async fn handle_error(status: u16, response: reqwest::Response) -> ProvisionError {
        let body = response.text().await.unwrap_or_default();

        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or(body);

        match status {
            401 | 403 => ProvisionError::Unauthorized,
            _ => {
                warn!(status, %message, "command endpoint returned an error");
                ProvisionError::Api {
                    code: status,
                    message,
                }
            }
        }
    }
}

#[async_trait]
impl CommandRunner for RestfulClient {
    #[instrument(skip(self, command), fields(prefix = %command.prefix, entity = %command.entity))]
    async fn run_command(&self, command: &MonCommand) -> Result<CommandOutput> {
        if let Some(limiter) = &self.inner.rate_limiter {
            limiter.until_ready().await;
        }

        debug!(url = %self.inner.request_url, "POST command");

        let mut request = self
            .inner
            .http
            .post(self.inner.request_url.clone())
            .query(&[("wait", "1")])
            .json(command);
        if let Some((user, key)) = &self.inner.credentials {
            request = request.basic_auth(user, Some(key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.map_transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error(status.as_u16(), response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(&e))?;
        let output: CommandOutput = serde_json::from_str(&body)?;
        debug!(status = output.status, "command finished");
        Ok(output)
    }
}

/// Builder for configuring a [`RestfulClient`]
pub struct RestfulClientBuilder {
    base_url: String,
    credentials: Option<(String, String)>,
    timeout: Duration,
    user_agent: String,
    rate_limit: Option<RateLimitConfig>,
}

impl RestfulClientBuilder {
    /// Create a new builder for the given base URL
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            credentials: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("nfs-provision/{}", env!("CARGO_PKG_VERSION")),
            rate_limit: None,
        }
    }

    /// Authenticate with HTTP basic auth
    #[must_use]
    pub fn credentials(mut self, user: impl Into<String>, key: impl Into<String>) -> Self {
        self.credentials = Some((user.into(), key.into()));
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Throttle outgoing commands
    #[must_use]
    pub const fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = Some(config);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<RestfulClient> {
        let mut base = Url::parse(&self.base_url)
            .map_err(|e| ProvisionError::Config(format!("invalid base URL '{}': {e}", self.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(ProvisionError::Config(format!(
                "base URL '{}' cannot carry a path",
                self.base_url
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let request_url = base
            .join(REQUEST_PATH)
            .map_err(|e| ProvisionError::Config(e.to_string()))?;

        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .gzip(true)
            .build()
            .map_err(|e| ProvisionError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(RestfulClient {
            inner: Arc::new(ClientInner {
                http,
                request_url,
                credentials: self.credentials,
                timeout: self.timeout,
                rate_limiter: self
                    .rate_limit
                    .map(|config| DefaultDirectRateLimiter::direct(config.quota())),
            }),
        })
    }
}
