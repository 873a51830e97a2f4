//! Client configuration.
//!
//! [`ClientConfig`] is assembled by [`EdgenBuilder`](crate::client::EdgenBuilder)
//! and is read-only after the client is constructed; concurrent calls share it
//! without locking.

use std::time::Duration;

use secrecy::SecretString;

use crate::retry::RetryPolicy;

/// Library defaults, matching the reference client.
pub(crate) mod defaults {
    use std::time::Duration;

    /// Where a local Edgen server listens by default.
    pub const BASE_URL: &str = "http://127.0.0.1:3000/v1";
    /// Per-request timeout (requests against local models can be slow).
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);
    /// Retries after the initial attempt.
    pub const MAX_RETRIES: u32 = 2;
    pub const USER_AGENT: &str = concat!("edgen-rs/", env!("CARGO_PKG_VERSION"));

    pub mod env {
        pub const API_KEY: &str = "EDGEN_API_KEY";
        pub const ORG_ID: &str = "EDGEN_ORG_ID";
        pub const BASE_URL: &str = "EDGEN_BASE_URL";
    }
}

/// Resolved, immutable configuration shared by every call of one client.
#[derive(Debug, Clone)]
pub(crate) struct ClientConfig {
    pub base_url: String,
    /// Bearer credential; an empty/absent key sends no Authorization header.
    pub api_key: Option<SecretString>,
    /// Sent as the `Edgen-Organization` header when set.
    pub organization: Option<String>,
    /// Headers attached to every request, overridable per call.
    pub default_headers: Vec<(String, String)>,
    /// Query parameters attached to every request, overridable per call.
    pub default_query: Vec<(String, String)>,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_policy: RetryPolicy,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::BASE_URL.to_string(),
            api_key: None,
            organization: None,
            default_headers: Vec::new(),
            default_query: Vec::new(),
            timeout: defaults::REQUEST_TIMEOUT,
            max_retries: defaults::MAX_RETRIES,
            retry_policy: RetryPolicy::default(),
            user_agent: defaults::USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Join an API path onto the base URL.
    pub(crate) fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
