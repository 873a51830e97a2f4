//! The transport executor.
//!
//! Owns the lifecycle of one logical call:
//! `Building -> Sending -> {Succeeded | Retrying -> Sending | Failed}`.
//! Each attempt is issued through `reqwest` under the descriptor's timeout;
//! transient failures consult the retry policy and sleep a backoff before
//! the next attempt, with the caller's cancellation handle able to interrupt
//! both the in-flight send and the backoff sleep. Attempts are strictly
//! sequential: a retry replaces the previous attempt, it never runs
//! concurrently with it.

use std::time::{Duration, Instant};

use reqwest::Method;
use serde::de::DeserializeOwned;

use super::promise::{ApiPromise, BufferedResponse, StreamPromise, StreamingResponse};
use super::{RequestBody, RequestDescriptor, RequestOptions};
use crate::config::ClientConfig;
use crate::error::EdgenError;
use crate::retry;
use crate::utils::cancel::CancelHandle;

/// The failure of a single attempt, with any `Retry-After` hint that came
/// with it.
type AttemptFailure = (EdgenError, Option<Duration>);

/// Shared request engine behind every resource method.
#[derive(Debug, Clone)]
pub(crate) struct Transport {
    http: reqwest::Client,
    config: ClientConfig,
}

impl Transport {
    pub(crate) fn new(http: reqwest::Client, config: ClientConfig) -> Self {
        Self { http, config }
    }

    /// Buffered entry point: the response body is materialized and parsed
    /// as JSON when the promise is observed.
    pub(crate) fn execute<T>(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> ApiPromise<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let transport = self.clone();
        let path = path.to_string();
        ApiPromise::new(Box::pin(async move {
            transport.run_buffered(method, &path, body, options).await
        }))
    }

    /// Streaming entry point: the response body is handed to an SSE chunk
    /// stream instead of being buffered.
    pub(crate) fn execute_stream<T>(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> StreamPromise<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let transport = self.clone();
        let path = path.to_string();
        StreamPromise::new(Box::pin(async move {
            transport.run_streaming(method, &path, body, options).await
        }))
    }

    /// Buffered entry point over typed parameters; serialization failures
    /// resolve the promise with `InvalidRequest` without issuing a request.
    pub(crate) fn execute_json<T>(
        &self,
        method: Method,
        path: &str,
        params: &impl serde::Serialize,
        stream: Option<bool>,
        options: RequestOptions,
    ) -> ApiPromise<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        match super::json_body(params, stream) {
            Ok(body) => self.execute(method, path, body, options),
            Err(e) => ApiPromise::new(Box::pin(async move { Err(e) })),
        }
    }

    /// Streaming entry point over typed parameters.
    pub(crate) fn execute_stream_json<T>(
        &self,
        method: Method,
        path: &str,
        params: &impl serde::Serialize,
        stream: Option<bool>,
        options: RequestOptions,
    ) -> StreamPromise<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        match super::json_body(params, stream) {
            Ok(body) => self.execute_stream(method, path, body, options),
            Err(e) => StreamPromise::new(Box::pin(async move { Err(e) })),
        }
    }

    async fn run_buffered(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> Result<BufferedResponse, EdgenError> {
        let desc = RequestDescriptor::build(&self.config, method, path, body, options)?;
        let cancel = desc.cancel.clone().unwrap_or_default();
        tracing::debug!(
            request_id = %desc.request_id,
            method = %desc.method,
            path = %desc.path,
            "issuing request"
        );

        let mut attempt = 0u32;
        loop {
            if cancel.is_cancelled() {
                return Err(EdgenError::UserAbort);
            }
            let started = Instant::now();
            let outcome = tokio::select! {
                _ = cancel.cancelled() => return Err(EdgenError::UserAbort),
                outcome = self.attempt_buffered(&desc) => outcome,
            };
            let latency_ms = started.elapsed().as_millis() as u64;

            let (error, retry_after) = match outcome {
                Ok(parts) => {
                    tracing::debug!(
                        request_id = %desc.request_id,
                        status = parts.status.as_u16(),
                        attempt,
                        latency_ms,
                        "request succeeded"
                    );
                    return Ok(parts);
                }
                Err(failure) => failure,
            };
            attempt = self
                .backoff_or_fail(&desc, &cancel, attempt, latency_ms, error, retry_after)
                .await?;
        }
    }

    async fn run_streaming(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> Result<StreamingResponse, EdgenError> {
        let desc = RequestDescriptor::build(&self.config, method, path, body, options)?;
        let cancel = desc.cancel.clone().unwrap_or_default();
        tracing::debug!(
            request_id = %desc.request_id,
            method = %desc.method,
            path = %desc.path,
            "issuing streaming request"
        );

        let mut attempt = 0u32;
        loop {
            if cancel.is_cancelled() {
                return Err(EdgenError::UserAbort);
            }
            let started = Instant::now();
            let outcome = tokio::select! {
                _ = cancel.cancelled() => return Err(EdgenError::UserAbort),
                outcome = self.attempt_streaming(&desc) => outcome,
            };
            let latency_ms = started.elapsed().as_millis() as u64;

            let (error, retry_after) = match outcome {
                Ok(response) => {
                    tracing::debug!(
                        request_id = %desc.request_id,
                        status = response.status().as_u16(),
                        attempt,
                        latency_ms,
                        "stream handshake succeeded"
                    );
                    return Ok(StreamingResponse {
                        response,
                        cancel: desc.cancel.clone(),
                        request_id: desc.request_id.clone(),
                    });
                }
                Err(failure) => failure,
            };
            attempt = self
                .backoff_or_fail(&desc, &cancel, attempt, latency_ms, error, retry_after)
                .await?;
        }
    }

    /// Decide between `Retrying` and `Failed`. Sleeps the computed backoff
    /// (cancellation-aware) and returns the next attempt number, or the
    /// final error once the failure is terminal or the budget is spent.
    async fn backoff_or_fail(
        &self,
        desc: &RequestDescriptor,
        cancel: &CancelHandle,
        attempt: u32,
        latency_ms: u64,
        error: EdgenError,
        retry_after: Option<Duration>,
    ) -> Result<u32, EdgenError> {
        if !error.is_retryable() || attempt >= desc.max_retries {
            tracing::warn!(
                request_id = %desc.request_id,
                status = error.status(),
                attempt,
                latency_ms,
                error = %error,
                "request failed"
            );
            return Err(error);
        }

        let delay = self.config.retry_policy.delay_for(attempt, retry_after);
        tracing::warn!(
            request_id = %desc.request_id,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "retrying after transient failure"
        );
        tokio::select! {
            _ = cancel.cancelled() => return Err(EdgenError::UserAbort),
            _ = tokio::time::sleep(delay) => {}
        }
        Ok(attempt + 1)
    }

    /// One buffered attempt. The timeout covers the send and the full body
    /// read; a 2xx yields the materialized body, anything else classifies
    /// into the error taxonomy.
    async fn attempt_buffered(
        &self,
        desc: &RequestDescriptor,
    ) -> Result<BufferedResponse, AttemptFailure> {
        let fut = async {
            let response = self.send(desc).await.map_err(|e| (e, None))?;
            let status = response.status();
            let headers = response.headers().clone();

            if !status.is_success() {
                let retry_after = retry::retry_after_hint(&headers);
                let text = response.text().await.unwrap_or_default();
                return Err((
                    EdgenError::from_status(status.as_u16(), &headers, &text),
                    retry_after,
                ));
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| (EdgenError::from_reqwest(e), None))?;
            Ok(BufferedResponse {
                status,
                headers,
                body: body.to_vec(),
                request_id: desc.request_id.clone(),
            })
        };

        match tokio::time::timeout(desc.timeout, fut).await {
            Ok(outcome) => outcome,
            Err(_) => Err((EdgenError::ConnectionTimeout, None)),
        }
    }

    /// One streaming attempt. The timeout covers the handshake only (through
    /// response headers); once the stream is live, body failures surface
    /// through the chunk stream rather than as a silent truncation.
    async fn attempt_streaming(
        &self,
        desc: &RequestDescriptor,
    ) -> Result<reqwest::Response, AttemptFailure> {
        let response = match tokio::time::timeout(desc.timeout, self.send(desc)).await {
            Ok(outcome) => outcome.map_err(|e| (e, None))?,
            Err(_) => return Err((EdgenError::ConnectionTimeout, None)),
        };

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let retry_after = retry::retry_after_hint(&headers);
            let text = response.text().await.unwrap_or_default();
            return Err((
                EdgenError::from_status(status.as_u16(), &headers, &text),
                retry_after,
            ));
        }
        Ok(response)
    }

    /// Build and send one attempt. Multipart bodies are rebuilt from their
    /// buffered spec so every attempt sends identical bytes.
    async fn send(&self, desc: &RequestDescriptor) -> Result<reqwest::Response, EdgenError> {
        let mut request = self
            .http
            .request(desc.method.clone(), &desc.url)
            .headers(desc.headers.clone());
        if !desc.query.is_empty() {
            request = request.query(&desc.query);
        }
        request = match &desc.body {
            RequestBody::Empty => request,
            RequestBody::Json(json) => request.json(json),
            RequestBody::Multipart(spec) => request.multipart(spec.build()?),
        };
        request.send().await.map_err(EdgenError::from_reqwest)
    }
}
