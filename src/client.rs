//! The Edgen API client.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use crate::config::{ClientConfig, defaults};
use crate::error::EdgenError;
use crate::http::transport::Transport;
use crate::resources::{Audio, Chat, Completions, Misc};
use crate::retry::RetryPolicy;

/// API client for the Edgen inference server.
///
/// Construction resolves configuration once (builder values, then
/// environment, then library defaults); after that the client is immutable
/// and cheap to clone, and any number of calls may be in flight
/// concurrently. Resources share one transport by reference.
///
/// ```rust,no_run
/// use edgen::Edgen;
/// use edgen::types::chat::{ChatCompletionCreateParams, ChatCompletionMessageParam};
///
/// # async fn run() -> Result<(), edgen::EdgenError> {
/// let client = Edgen::new()?;
/// let completion = client
///     .chat()
///     .completions()
///     .create(ChatCompletionCreateParams::new(
///         "default",
///         vec![ChatCompletionMessageParam::user("Say this is a test")],
///     ))
///     .await?;
/// println!("{:?}", completion.choices[0].message.content);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Edgen {
    transport: Arc<Transport>,
}

impl Edgen {
    /// Build a client from environment variables (`EDGEN_API_KEY`,
    /// `EDGEN_ORG_ID`, `EDGEN_BASE_URL`) and library defaults.
    pub fn new() -> Result<Self, EdgenError> {
        Self::builder().build()
    }

    pub fn builder() -> EdgenBuilder {
        EdgenBuilder::default()
    }

    /// The `/chat` resource.
    pub fn chat(&self) -> Chat {
        Chat::new(self.transport.clone())
    }

    /// The `/completions` resource.
    pub fn completions(&self) -> Completions {
        Completions::new(self.transport.clone())
    }

    /// The `/audio` resource.
    pub fn audio(&self) -> Audio {
        Audio::new(self.transport.clone())
    }

    /// The `/misc` resource.
    pub fn misc(&self) -> Misc {
        Misc::new(self.transport.clone())
    }
}

/// Builder for [`Edgen`].
///
/// Unset values fall back to the environment and then to library defaults:
/// base URL `http://127.0.0.1:3000/v1`, timeout 600 s, 2 retries.
#[derive(Debug, Clone, Default)]
pub struct EdgenBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    organization: Option<String>,
    default_headers: Vec<(String, String)>,
    default_query: Vec<(String, String)>,
    timeout: Option<Duration>,
    max_retries: Option<u32>,
    retry_policy: Option<RetryPolicy>,
    user_agent: Option<String>,
    http_client: Option<reqwest::Client>,
}

impl EdgenBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the API base URL, e.g. `http://10.0.0.2:8000/v1`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the API key, sent as a bearer credential.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the organization, sent as the `Edgen-Organization` header.
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Add a header to every request. Individual calls can override or
    /// remove it through their [`RequestOptions`](crate::RequestOptions).
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Add a query parameter to every request.
    pub fn with_default_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_query.push((name.into(), value.into()));
        self
    }

    /// Per-request timeout. Timed-out requests are retried by default, so a
    /// call can take longer than this before it resolves.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// How many times to retry transient failures (0 disables retries).
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Override the backoff schedule used between retries.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Supply a preconfigured `reqwest` client (proxy, TLS, pool tuning).
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn build(self) -> Result<Edgen, EdgenError> {
        let base_url = self
            .base_url
            .or_else(|| env_var(defaults::env::BASE_URL))
            .unwrap_or_else(|| defaults::BASE_URL.to_string());
        reqwest::Url::parse(&base_url)
            .map_err(|e| EdgenError::invalid_request(format!("invalid base URL {base_url:?}: {e}")))?;

        let api_key = self
            .api_key
            .or_else(|| env_var(defaults::env::API_KEY))
            .map(SecretString::from);
        let organization = self
            .organization
            .or_else(|| env_var(defaults::env::ORG_ID));

        let config = ClientConfig {
            base_url,
            api_key,
            organization,
            default_headers: self.default_headers,
            default_query: self.default_query,
            timeout: self.timeout.unwrap_or(defaults::REQUEST_TIMEOUT),
            max_retries: self.max_retries.unwrap_or(defaults::MAX_RETRIES),
            retry_policy: self.retry_policy.unwrap_or_default(),
            user_agent: self
                .user_agent
                .unwrap_or_else(|| defaults::USER_AGENT.to_string()),
        };

        // Timeouts are applied per request by the transport, not here, so
        // streaming bodies can outlive the handshake budget.
        let http = match self.http_client {
            Some(client) => client,
            None => reqwest::Client::builder().build().map_err(|e| {
                EdgenError::invalid_request(format!("failed to construct HTTP client: {e}"))
            })?,
        };

        Ok(Edgen {
            transport: Arc::new(Transport::new(http, config)),
        })
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
