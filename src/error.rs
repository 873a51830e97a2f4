//! Error handling for the Edgen client.
//!
//! Every failure surfaced by this crate is an [`EdgenError`]. Protocol-level
//! failures (a response arrived with a non-2xx status) classify into one
//! variant per status family and carry the server's structured error payload;
//! connection-level failures (no usable response) and decode/stream-level
//! failures have their own variants.
//!
//! # Example
//!
//! ```rust,ignore
//! match client.misc().version().await {
//!     Ok(version) => println!("{}.{}.{}", version.major, version.minor, version.patch),
//!     Err(EdgenError::NotFound(body)) => eprintln!("no such route: {}", body.message),
//!     Err(other) => eprintln!("request failed: {other}"),
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use reqwest::header::HeaderMap;
use serde::Deserialize;

/// Structured error payload extracted from a non-2xx API response.
///
/// The Edgen server reports failures as `{"error": {"message", "type",
/// "param", "code"}}`. All fields except `status` and `message` are
/// best-effort: they are `None` when the response body is missing, not JSON,
/// or not in the envelope shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorBody {
    /// The HTTP status of the response.
    pub status: u16,
    /// Human-readable description of the failure.
    pub message: String,
    /// Machine-readable error code, e.g. `model_not_found`.
    pub code: Option<String>,
    /// Error category reported by the server, e.g. `invalid_request_error`.
    pub error_type: Option<String>,
    /// The request parameter the error refers to, if any.
    pub param: Option<String>,
    /// The `x-request-id` response header, for support/debugging.
    pub request_id: Option<String>,
}

impl fmt::Display for ApiErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.message)?;
        if let Some(code) = &self.code {
            write!(f, " (code: {code})")?;
        }
        if let Some(id) = &self.request_id {
            write!(f, " [request id: {id}]")?;
        }
        Ok(())
    }
}

/// The wire shape of the server's error envelope.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
    #[serde(rename = "type")]
    error_type: Option<String>,
    param: Option<String>,
    code: Option<String>,
}

/// All errors surfaced by this crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EdgenError {
    /// The request never produced a usable response: DNS, TCP, or TLS
    /// failure, or the connection dropped while reading a buffered body.
    #[error("connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Arc<reqwest::Error>>,
    },

    /// The configured timeout elapsed before a response materialized.
    #[error("request timed out")]
    ConnectionTimeout,

    /// The caller cancelled the request through its [`CancelHandle`].
    ///
    /// [`CancelHandle`]: crate::utils::cancel::CancelHandle
    #[error("request was aborted by the caller")]
    UserAbort,

    /// 400 Bad Request.
    #[error("{0}")]
    BadRequest(ApiErrorBody),

    /// 401 Unauthorized.
    #[error("{0}")]
    Authentication(ApiErrorBody),

    /// 403 Forbidden.
    #[error("{0}")]
    PermissionDenied(ApiErrorBody),

    /// 404 Not Found.
    #[error("{0}")]
    NotFound(ApiErrorBody),

    /// 409 Conflict.
    #[error("{0}")]
    Conflict(ApiErrorBody),

    /// 422 Unprocessable Entity.
    #[error("{0}")]
    UnprocessableEntity(ApiErrorBody),

    /// 429 Too Many Requests.
    #[error("{0}")]
    RateLimit(ApiErrorBody),

    /// Any 5xx response.
    #[error("{0}")]
    InternalServer(ApiErrorBody),

    /// A non-2xx status outside the classified set (the status is carried).
    #[error("{0}")]
    UnknownStatus(ApiErrorBody),

    /// A 2xx response body, or an SSE frame payload, that is not valid JSON
    /// for the expected type. Never retried: resending cannot fix a format
    /// mismatch.
    #[error("decode error: {message}")]
    Decode { message: String },

    /// A streaming body failed after the response headers were received,
    /// including connection-closed-mid-frame truncation.
    #[error("stream error: {message}")]
    Stream { message: String },

    /// The request could not be constructed from the given parameters.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },
}

impl EdgenError {
    /// Classify a non-2xx response into its taxonomy variant.
    ///
    /// Extracts the structured `{"error": {...}}` envelope when present,
    /// falling back to a body sample or the status' canonical reason.
    pub fn from_status(status: u16, headers: &HeaderMap, body_text: &str) -> Self {
        let detail = serde_json::from_str::<ErrorEnvelope>(body_text)
            .ok()
            .map(|env| env.error);

        let message = detail
            .as_ref()
            .and_then(|d| d.message.clone())
            .unwrap_or_else(|| {
                let sample: String = body_text.trim().chars().take(200).collect();
                if sample.is_empty() {
                    reqwest::StatusCode::from_u16(status)
                        .ok()
                        .and_then(|s| s.canonical_reason())
                        .unwrap_or("api error")
                        .to_string()
                } else {
                    sample
                }
            });

        let body = ApiErrorBody {
            status,
            message,
            code: detail.as_ref().and_then(|d| d.code.clone()),
            error_type: detail.as_ref().and_then(|d| d.error_type.clone()),
            param: detail.as_ref().and_then(|d| d.param.clone()),
            request_id: header_value(headers, "x-request-id"),
        };

        match status {
            400 => Self::BadRequest(body),
            401 => Self::Authentication(body),
            403 => Self::PermissionDenied(body),
            404 => Self::NotFound(body),
            409 => Self::Conflict(body),
            422 => Self::UnprocessableEntity(body),
            429 => Self::RateLimit(body),
            500..=599 => Self::InternalServer(body),
            _ => Self::UnknownStatus(body),
        }
    }

    /// Wrap a low-level `reqwest` failure, distinguishing timeouts.
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::ConnectionTimeout;
        }
        Self::Connection {
            message: err.to_string(),
            source: Some(Arc::new(err)),
        }
    }

    pub(crate) fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub(crate) fn stream(message: impl Into<String>) -> Self {
        Self::Stream {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// The HTTP status carried by this error, when a response was received.
    pub fn status(&self) -> Option<u16> {
        self.api_body().map(|b| b.status)
    }

    /// The structured server payload, for protocol-level errors.
    pub fn api_body(&self) -> Option<&ApiErrorBody> {
        match self {
            Self::BadRequest(b)
            | Self::Authentication(b)
            | Self::PermissionDenied(b)
            | Self::NotFound(b)
            | Self::Conflict(b)
            | Self::UnprocessableEntity(b)
            | Self::RateLimit(b)
            | Self::InternalServer(b)
            | Self::UnknownStatus(b) => Some(b),
            _ => None,
        }
    }

    /// Whether the transport may re-issue the request after this failure.
    ///
    /// Connection errors, timeouts, and HTTP 408/409/429/5xx are transient;
    /// everything else is terminal on first occurrence.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection { .. } | Self::ConnectionTimeout => true,
            Self::Conflict(_) | Self::RateLimit(_) | Self::InternalServer(_) => true,
            Self::UnknownStatus(body) => body.status == 408,
            _ => false,
        }
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
