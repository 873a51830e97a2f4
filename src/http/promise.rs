//! Deferred results.
//!
//! Each resource method returns a promise wrapping exactly one transport
//! execution. The caller picks an observation mode — the parsed value, the
//! raw response, or both — and every mode observes the same execution: the
//! network call is issued once no matter which accessor consumes the promise.
//!
//! Buffered and streamed calls are separate entry points, so they get
//! separate promise types: [`ApiPromise`] resolves to a deserialized value,
//! [`StreamPromise`] to a [`ChunkStream`].

use std::future::IntoFuture;
use std::marker::PhantomData;

use futures::future::BoxFuture;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::EdgenError;
use crate::streaming::ChunkStream;
use crate::utils::cancel::CancelHandle;

/// A buffered 2xx response held by the transport.
pub(crate) struct BufferedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub request_id: String,
}

/// A streaming 2xx response whose body has not been consumed yet.
pub(crate) struct StreamingResponse {
    pub response: reqwest::Response,
    pub cancel: Option<CancelHandle>,
    pub request_id: String,
}

/// Status, headers, and body access for one response.
///
/// For buffered calls the body bytes are available; for streamed calls the
/// body is marked live (it belongs to the chunk stream) and only the
/// metadata is observable here.
#[derive(Debug)]
pub struct RawResponse {
    status: StatusCode,
    headers: HeaderMap,
    request_id: String,
    body: RawBody,
}

#[derive(Debug)]
enum RawBody {
    Buffered(Vec<u8>),
    Live,
}

impl RawResponse {
    fn buffered(parts: &BufferedResponse) -> Self {
        Self {
            status: parts.status,
            headers: parts.headers.clone(),
            request_id: parts.request_id.clone(),
            body: RawBody::Buffered(parts.body.clone()),
        }
    }

    fn live(status: StatusCode, headers: HeaderMap, request_id: String) -> Self {
        Self {
            status,
            headers,
            request_id,
            body: RawBody::Live,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The client-generated id correlating this call's log events.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// The buffered body bytes; `None` for streamed calls, whose body is
    /// consumed by the chunk stream.
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.body {
            RawBody::Buffered(bytes) => Some(bytes),
            RawBody::Live => None,
        }
    }

    /// Whether the body belongs to a live stream rather than this value.
    pub fn is_live_stream(&self) -> bool {
        matches!(self.body, RawBody::Live)
    }
}

/// Deferred result of a buffered API call.
///
/// `.await` resolves to the deserialized value; [`into_raw_response`] and
/// [`with_raw_response`] expose the response metadata and the byte-identical
/// body the value was parsed from.
///
/// [`into_raw_response`]: Self::into_raw_response
/// [`with_raw_response`]: Self::with_raw_response
#[must_use = "an ApiPromise issues no request until awaited"]
pub struct ApiPromise<T> {
    fut: BoxFuture<'static, Result<BufferedResponse, EdgenError>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ApiPromise<T>
where
    T: DeserializeOwned + Send + 'static,
{
    pub(crate) fn new(fut: BoxFuture<'static, Result<BufferedResponse, EdgenError>>) -> Self {
        Self {
            fut,
            _marker: PhantomData,
        }
    }

    /// Resolve to the raw response without deserializing the body.
    pub async fn into_raw_response(self) -> Result<RawResponse, EdgenError> {
        let parts = self.fut.await?;
        Ok(RawResponse::buffered(&parts))
    }

    /// Resolve to both the parsed value and the raw response it came from.
    pub async fn with_raw_response(self) -> Result<(T, RawResponse), EdgenError> {
        let parts = self.fut.await?;
        let value = parse_body::<T>(&parts)?;
        Ok((value, RawResponse::buffered(&parts)))
    }
}

impl<T> IntoFuture for ApiPromise<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = Result<T, EdgenError>;
    type IntoFuture = BoxFuture<'static, Result<T, EdgenError>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            let parts = self.fut.await?;
            parse_body::<T>(&parts)
        })
    }
}

fn parse_body<T: DeserializeOwned>(parts: &BufferedResponse) -> Result<T, EdgenError> {
    serde_json::from_slice(&parts.body)
        .map_err(|e| EdgenError::decode(format!("failed to decode response body: {e}")))
}

/// Deferred result of a streamed API call.
///
/// `.await` resolves to the typed [`ChunkStream`]; the raw-response accessors
/// expose the handshake metadata, with the body marked live.
#[must_use = "a StreamPromise issues no request until awaited"]
pub struct StreamPromise<T> {
    fut: BoxFuture<'static, Result<StreamingResponse, EdgenError>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> StreamPromise<T>
where
    T: DeserializeOwned + Send + 'static,
{
    pub(crate) fn new(fut: BoxFuture<'static, Result<StreamingResponse, EdgenError>>) -> Self {
        Self {
            fut,
            _marker: PhantomData,
        }
    }

    /// Resolve to the raw handshake response, discarding the chunk stream
    /// (which closes the connection).
    pub async fn into_raw_response(self) -> Result<RawResponse, EdgenError> {
        let streaming = self.fut.await?;
        Ok(RawResponse::live(
            streaming.response.status(),
            streaming.response.headers().clone(),
            streaming.request_id,
        ))
    }

    /// Resolve to both the chunk stream and the handshake metadata.
    pub async fn with_raw_response(self) -> Result<(ChunkStream<T>, RawResponse), EdgenError> {
        let streaming = self.fut.await?;
        let raw = RawResponse::live(
            streaming.response.status(),
            streaming.response.headers().clone(),
            streaming.request_id.clone(),
        );
        Ok((into_chunks(streaming), raw))
    }
}

impl<T> IntoFuture for StreamPromise<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = Result<ChunkStream<T>, EdgenError>;
    type IntoFuture = BoxFuture<'static, Result<ChunkStream<T>, EdgenError>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            let streaming = self.fut.await?;
            Ok(into_chunks(streaming))
        })
    }
}

fn into_chunks<T>(streaming: StreamingResponse) -> ChunkStream<T>
where
    T: DeserializeOwned + Send + 'static,
{
    // Pinning makes the reqwest body stream Unpin for the decoder.
    let body = Box::pin(streaming.response.bytes_stream());
    ChunkStream::from_byte_stream(body, streaming.cancel)
}
