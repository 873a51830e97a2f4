//! The `/misc` resource.

use std::sync::Arc;

use reqwest::Method;

use crate::http::promise::ApiPromise;
use crate::http::transport::Transport;
use crate::http::{RequestBody, RequestOptions};
use crate::types::misc::VersionInfo;

/// Miscellaneous server endpoints.
#[derive(Debug, Clone)]
pub struct Misc {
    transport: Arc<Transport>,
}

impl Misc {
    pub(crate) fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    /// Fetch the server's version (`GET /version`).
    pub fn version(&self) -> ApiPromise<VersionInfo> {
        self.version_with_options(RequestOptions::new())
    }

    /// [`version`](Self::version) with per-call overrides.
    pub fn version_with_options(&self, options: RequestOptions) -> ApiPromise<VersionInfo> {
        self.transport
            .execute(Method::GET, "/version", RequestBody::Empty, options)
    }
}
