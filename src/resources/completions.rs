//! The `/completions` resource.

use std::sync::Arc;

use reqwest::Method;

use crate::http::RequestOptions;
use crate::http::promise::{ApiPromise, StreamPromise};
use crate::http::transport::Transport;
use crate::types::completions::{Completion, CompletionCreateParams};

/// `POST /completions`.
#[derive(Debug, Clone)]
pub struct Completions {
    transport: Arc<Transport>,
}

impl Completions {
    pub(crate) fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    /// Create a completion for the provided prompt and parameters.
    pub fn create(&self, params: CompletionCreateParams) -> ApiPromise<Completion> {
        self.create_with_options(params, RequestOptions::new())
    }

    /// [`create`](Self::create) with per-call overrides.
    pub fn create_with_options(
        &self,
        params: CompletionCreateParams,
        options: RequestOptions,
    ) -> ApiPromise<Completion> {
        self.transport
            .execute_json(Method::POST, "/completions", &params, Some(false), options)
    }

    /// Stream a completion; each chunk is a [`Completion`] carrying partial
    /// `text` in its choices.
    pub fn create_stream(&self, params: CompletionCreateParams) -> StreamPromise<Completion> {
        self.create_stream_with_options(params, RequestOptions::new())
    }

    /// [`create_stream`](Self::create_stream) with per-call overrides.
    pub fn create_stream_with_options(
        &self,
        params: CompletionCreateParams,
        options: RequestOptions,
    ) -> StreamPromise<Completion> {
        self.transport
            .execute_stream_json(Method::POST, "/completions", &params, Some(true), options)
    }
}
