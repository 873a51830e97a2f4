//! Wire types for the Edgen API.
//!
//! These mirror the server's JSON request and response shapes. Optional
//! request fields serialize only when set, so absent options never reach the
//! wire.

pub mod audio;
pub mod chat;
pub mod completions;
pub mod misc;
pub mod shared;

pub use audio::{AudioResponseFormat, Transcription, TranscriptionCreateParams};
pub use chat::{
    ChatCompletion, ChatCompletionChunk, ChatCompletionCreateParams, ChatCompletionMessage,
    ChatCompletionMessageParam,
};
pub use completions::{Completion, CompletionCreateParams, CompletionUsage};
pub use misc::VersionInfo;
pub use shared::{FunctionDefinition, FunctionParameters};
