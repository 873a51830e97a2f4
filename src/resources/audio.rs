//! The `/audio` resource.

use std::sync::Arc;

use reqwest::Method;

use crate::http::promise::ApiPromise;
use crate::http::transport::Transport;
use crate::http::{FormSpec, RequestBody, RequestOptions};
use crate::types::audio::{Transcription, TranscriptionCreateParams};

/// The `/audio` resource namespace.
#[derive(Debug, Clone)]
pub struct Audio {
    transport: Arc<Transport>,
}

impl Audio {
    pub(crate) fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    pub fn transcriptions(&self) -> Transcriptions {
        Transcriptions {
            transport: self.transport.clone(),
        }
    }
}

/// `POST /audio/transcriptions` (multipart/form-data).
#[derive(Debug, Clone)]
pub struct Transcriptions {
    transport: Arc<Transport>,
}

impl Transcriptions {
    /// Transcribe audio into the input language.
    pub fn create(&self, params: TranscriptionCreateParams) -> ApiPromise<Transcription> {
        self.create_with_options(params, RequestOptions::new())
    }

    /// [`create`](Self::create) with per-call overrides.
    pub fn create_with_options(
        &self,
        params: TranscriptionCreateParams,
        options: RequestOptions,
    ) -> ApiPromise<Transcription> {
        self.transport.execute(
            Method::POST,
            "/audio/transcriptions",
            RequestBody::Multipart(build_form(params)),
            options,
        )
    }
}

/// Lay the typed params out as form fields; the file part carries its
/// buffered bytes and original filename.
fn build_form(params: TranscriptionCreateParams) -> FormSpec {
    let mut form = FormSpec::new()
        .file("file", params.file)
        .text("model", params.model);
    if let Some(language) = params.language {
        form = form.text("language", language);
    }
    if let Some(prompt) = params.prompt {
        form = form.text("prompt", prompt);
    }
    if let Some(format) = params.response_format {
        form = form.text("response_format", format.as_str());
    }
    if let Some(temperature) = params.temperature {
        form = form.text("temperature", temperature.to_string());
    }
    form
}
