//! Request descriptors, per-call options, and header/query merging.

pub(crate) mod promise;
pub(crate) mod transport;

use std::time::Duration;

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use secrecy::ExposeSecret;

use crate::config::ClientConfig;
use crate::error::EdgenError;
use crate::uploads::Uploadable;
use crate::utils::cancel::CancelHandle;

/// Per-call overrides for a single API request.
///
/// Anything unset falls back to the client configuration, which in turn falls
/// back to library defaults.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    headers: Vec<(String, Option<String>)>,
    query: Vec<(String, String)>,
    timeout: Option<Duration>,
    max_retries: Option<u32>,
    cancel: Option<CancelHandle>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or override a header for this call.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), Some(value.into())));
        self
    }

    /// Remove a default header for this call.
    pub fn without_header(mut self, name: impl Into<String>) -> Self {
        self.headers.push((name.into(), None));
        self
    }

    /// Add or override a query parameter for this call.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Override the request timeout for this call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the retry budget for this call (0 disables retries).
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Attach a cancellation handle to this call.
    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// A multipart form that can be materialized fresh for every attempt.
///
/// `multipart/form-data` bodies are single-read, so the descriptor stores
/// this spec instead of a built form and rebuilds per attempt; file parts are
/// already buffered in their [`Uploadable`], making each attempt's bytes
/// identical.
#[derive(Debug, Clone, Default)]
pub(crate) struct FormSpec {
    texts: Vec<(String, String)>,
    files: Vec<(String, Uploadable)>,
}

impl FormSpec {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.texts.push((name.into(), value.into()));
        self
    }

    pub(crate) fn file(mut self, name: impl Into<String>, file: Uploadable) -> Self {
        self.files.push((name.into(), file));
        self
    }

    pub(crate) fn build(&self) -> Result<reqwest::multipart::Form, EdgenError> {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in &self.texts {
            form = form.text(name.clone(), value.clone());
        }
        for (name, file) in &self.files {
            form = form.part(name.clone(), file.to_part()?);
        }
        Ok(form)
    }
}

/// The body of a request.
#[derive(Debug, Clone)]
pub(crate) enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(FormSpec),
}

/// Everything needed to issue (and re-issue) one logical request.
///
/// Immutable once built; only the multipart form is re-materialized per
/// attempt, from the same buffered spec.
#[derive(Debug, Clone)]
pub(crate) struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: RequestBody,
    pub timeout: Duration,
    pub max_retries: u32,
    pub cancel: Option<CancelHandle>,
    /// Client-generated id correlating log events for this logical call.
    pub request_id: String,
}

impl RequestDescriptor {
    pub(crate) fn build(
        config: &ClientConfig,
        method: Method,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> Result<Self, EdgenError> {
        let headers = merge_headers(config, &options.headers)?;
        let query = merge_query(&config.default_query, &options.query);

        Ok(Self {
            method,
            path: path.to_string(),
            url: config.url(path),
            query,
            headers,
            body,
            timeout: options.timeout.unwrap_or(config.timeout),
            max_retries: options.max_retries.unwrap_or(config.max_retries),
            cancel: options.cancel,
            request_id: uuid::Uuid::new_v4().to_string(),
        })
    }
}

/// Serialize typed parameters into a JSON body, injecting the wire-level
/// `stream` flag when the entry point dictates one.
pub(crate) fn json_body(
    params: &impl serde::Serialize,
    stream: Option<bool>,
) -> Result<RequestBody, EdgenError> {
    let mut value = serde_json::to_value(params).map_err(|e| {
        EdgenError::invalid_request(format!("parameters are not serializable: {e}"))
    })?;
    if let Some(stream) = stream {
        let Some(object) = value.as_object_mut() else {
            return Err(EdgenError::invalid_request(
                "parameters must serialize to a JSON object",
            ));
        };
        object.insert("stream".to_string(), serde_json::Value::Bool(stream));
    }
    Ok(RequestBody::Json(value))
}

/// Build the effective header map: library defaults, then client defaults,
/// then per-call overrides. A `None` override removes the header entirely.
fn merge_headers(
    config: &ClientConfig,
    overrides: &[(String, Option<String>)],
) -> Result<HeaderMap, EdgenError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        reqwest::header::USER_AGENT,
        parse_value(&config.user_agent)?,
    );

    if let Some(key) = &config.api_key {
        let key = key.expose_secret();
        if !key.is_empty() {
            let mut value = parse_value(&format!("Bearer {key}"))?;
            value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }
    }
    if let Some(org) = &config.organization {
        headers.insert(
            HeaderName::from_static("edgen-organization"),
            parse_value(org)?,
        );
    }

    for (name, value) in &config.default_headers {
        headers.insert(parse_name(name)?, parse_value(value)?);
    }
    for (name, value) in overrides {
        let name = parse_name(name)?;
        match value {
            Some(value) => {
                headers.insert(name, parse_value(value)?);
            }
            None => {
                headers.remove(name);
            }
        }
    }

    Ok(headers)
}

/// Per-call query pairs replace same-named client defaults; everything else
/// is appended in order.
fn merge_query(
    defaults: &[(String, String)],
    overrides: &[(String, String)],
) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = defaults
        .iter()
        .filter(|(name, _)| !overrides.iter().any(|(o, _)| o == name))
        .cloned()
        .collect();
    merged.extend(overrides.iter().cloned());
    merged
}

fn parse_name(name: &str) -> Result<HeaderName, EdgenError> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| EdgenError::invalid_request(format!("invalid header name {name:?}: {e}")))
}

fn parse_value(value: &str) -> Result<HeaderValue, EdgenError> {
    HeaderValue::from_str(value)
        .map_err(|e| EdgenError::invalid_request(format!("invalid header value {value:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    fn config_with_key() -> ClientConfig {
        ClientConfig {
            api_key: Some("sk-test".to_string().into()),
            organization: Some("acme".to_string()),
            default_headers: vec![("x-env".to_string(), "prod".to_string())],
            default_query: vec![("deployment".to_string(), "blue".to_string())],
            ..ClientConfig::default()
        }
    }

    #[test]
    fn descriptor_carries_auth_and_org_headers() {
        let desc = RequestDescriptor::build(
            &config_with_key(),
            Method::GET,
            "/version",
            RequestBody::Empty,
            RequestOptions::new(),
        )
        .unwrap();

        assert_eq!(desc.headers["authorization"], "Bearer sk-test");
        assert_eq!(desc.headers["edgen-organization"], "acme");
        assert_eq!(desc.headers["x-env"], "prod");
        assert_eq!(desc.url, "http://127.0.0.1:3000/v1/version");
    }

    #[test]
    fn empty_api_key_sends_no_authorization() {
        let config = ClientConfig {
            api_key: Some(String::new().into()),
            ..ClientConfig::default()
        };
        let desc = RequestDescriptor::build(
            &config,
            Method::GET,
            "/version",
            RequestBody::Empty,
            RequestOptions::new(),
        )
        .unwrap();
        assert!(!desc.headers.contains_key("authorization"));
    }

    #[test]
    fn call_overrides_replace_and_remove_defaults() {
        let options = RequestOptions::new()
            .with_header("x-env", "staging")
            .without_header("edgen-organization");
        let desc = RequestDescriptor::build(
            &config_with_key(),
            Method::POST,
            "/chat/completions",
            RequestBody::Empty,
            options,
        )
        .unwrap();

        assert_eq!(desc.headers["x-env"], "staging");
        assert!(!desc.headers.contains_key("edgen-organization"));
    }

    #[test]
    fn query_overrides_replace_same_named_defaults() {
        let options = RequestOptions::new()
            .with_query("deployment", "green")
            .with_query("trace", "1");
        let desc = RequestDescriptor::build(
            &config_with_key(),
            Method::GET,
            "/version",
            RequestBody::Empty,
            options,
        )
        .unwrap();

        assert_eq!(
            desc.query,
            vec![
                ("deployment".to_string(), "green".to_string()),
                ("trace".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn invalid_header_names_fail_fast() {
        let options = RequestOptions::new().with_header("bad header\n", "x");
        let err = RequestDescriptor::build(
            &ClientConfig::default(),
            Method::GET,
            "/version",
            RequestBody::Empty,
            options,
        )
        .unwrap_err();
        assert!(matches!(err, EdgenError::InvalidRequest { .. }));
    }

    #[test]
    fn per_call_overrides_leave_the_descriptor_timeout_and_retries() {
        let options = RequestOptions::new()
            .with_timeout(Duration::from_secs(5))
            .with_max_retries(0);
        let desc = RequestDescriptor::build(
            &ClientConfig::default(),
            Method::GET,
            "/version",
            RequestBody::Empty,
            options,
        )
        .unwrap();
        assert_eq!(desc.timeout, Duration::from_secs(5));
        assert_eq!(desc.max_retries, 0);
    }
}
