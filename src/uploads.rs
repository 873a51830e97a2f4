//! File-upload inputs for multipart endpoints.
//!
//! An [`Uploadable`] is a filename plus a fully buffered byte source. The
//! buffering is what makes retries safe: the transport rebuilds the multipart
//! form for every attempt from these bytes, so each attempt sends identical
//! content even though a `multipart/form-data` body is single-read.

use std::path::Path;

use crate::error::EdgenError;

/// A file to send in a multipart request.
#[derive(Debug, Clone)]
pub struct Uploadable {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl Uploadable {
    /// Build an upload from in-memory bytes.
    ///
    /// The content type is inferred from the file name's extension and can be
    /// overridden with [`with_content_type`](Self::with_content_type).
    pub fn from_bytes(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let file_name = file_name.into();
        let content_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            file_name,
            content_type,
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk into an upload.
    ///
    /// The file is read exactly once, up front; later retry attempts reuse
    /// the buffered bytes rather than re-opening the file.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, EdgenError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            EdgenError::invalid_request(format!("failed to read {}: {e}", path.display()))
        })?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file")
            .to_string();
        Ok(Self::from_bytes(file_name, bytes))
    }

    /// Override the inferred content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// The filename sent in the form part.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The content type sent in the form part.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Materialize a fresh form part from the buffered bytes.
    pub(crate) fn to_part(&self) -> Result<reqwest::multipart::Part, EdgenError> {
        reqwest::multipart::Part::bytes(self.bytes.clone())
            .file_name(self.file_name.clone())
            .mime_str(&self.content_type)
            .map_err(|e| {
                EdgenError::invalid_request(format!(
                    "invalid content type {:?}: {e}",
                    self.content_type
                ))
            })
    }
}
