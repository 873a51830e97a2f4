//! Audio transcription types.

use serde::{Deserialize, Serialize};

use crate::uploads::Uploadable;

/// A transcript produced from an audio file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
}

/// The format of the transcript output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioResponseFormat {
    Json,
    Text,
    Srt,
    VerboseJson,
    Vtt,
}

impl AudioResponseFormat {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
            Self::Srt => "srt",
            Self::VerboseJson => "verbose_json",
            Self::Vtt => "vtt",
        }
    }
}

/// Parameters for transcribing audio into the input language.
///
/// Sent as `multipart/form-data`; the file bytes are buffered in the
/// [`Uploadable`] so retried attempts resend identical content.
#[derive(Debug, Clone)]
pub struct TranscriptionCreateParams {
    /// The audio file to transcribe, in one of these formats: flac, mp3,
    /// mp4, mpeg, mpga, m4a, ogg, wav, or webm.
    pub file: Uploadable,

    /// ID of the model to use. Only `whisper-1` is currently available.
    pub model: String,

    /// The language of the input audio, in ISO-639-1 format. Supplying it
    /// improves accuracy and latency.
    pub language: Option<String>,

    /// An optional text to guide the model's style or continue a previous
    /// audio segment.
    pub prompt: Option<String>,

    pub response_format: Option<AudioResponseFormat>,

    /// The sampling temperature, between 0 and 1.
    pub temperature: Option<f64>,
}

impl TranscriptionCreateParams {
    pub fn new(file: Uploadable, model: impl Into<String>) -> Self {
        Self {
            file,
            model: model.into(),
            language: None,
            prompt: None,
            response_format: None,
            temperature: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_response_format(mut self, format: AudioResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}
