//! The `/chat` resource.

use std::sync::Arc;

use reqwest::Method;

use crate::http::RequestOptions;
use crate::http::promise::{ApiPromise, StreamPromise};
use crate::http::transport::Transport;
use crate::types::chat::{ChatCompletion, ChatCompletionChunk, ChatCompletionCreateParams};

/// The `/chat` resource namespace.
#[derive(Debug, Clone)]
pub struct Chat {
    transport: Arc<Transport>,
}

impl Chat {
    pub(crate) fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    pub fn completions(&self) -> ChatCompletions {
        ChatCompletions {
            transport: self.transport.clone(),
        }
    }
}

/// `POST /chat/completions`.
#[derive(Debug, Clone)]
pub struct ChatCompletions {
    transport: Arc<Transport>,
}

impl ChatCompletions {
    /// Create a model response for the given chat conversation.
    pub fn create(&self, params: ChatCompletionCreateParams) -> ApiPromise<ChatCompletion> {
        self.create_with_options(params, RequestOptions::new())
    }

    /// [`create`](Self::create) with per-call overrides.
    pub fn create_with_options(
        &self,
        params: ChatCompletionCreateParams,
        options: RequestOptions,
    ) -> ApiPromise<ChatCompletion> {
        self.transport.execute_json(
            Method::POST,
            "/chat/completions",
            &params,
            Some(false),
            options,
        )
    }

    /// Stream a model response as server-sent chunks, terminated by the
    /// server's `[DONE]` marker.
    pub fn create_stream(
        &self,
        params: ChatCompletionCreateParams,
    ) -> StreamPromise<ChatCompletionChunk> {
        self.create_stream_with_options(params, RequestOptions::new())
    }

    /// [`create_stream`](Self::create_stream) with per-call overrides.
    pub fn create_stream_with_options(
        &self,
        params: ChatCompletionCreateParams,
        options: RequestOptions,
    ) -> StreamPromise<ChatCompletionChunk> {
        self.transport.execute_stream_json(
            Method::POST,
            "/chat/completions",
            &params,
            Some(true),
            options,
        )
    }
}
