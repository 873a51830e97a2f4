//! API resources.
//!
//! Each resource is a thin wrapper over the shared transport: it knows its
//! path, its parameter/response types, and whether a call is buffered or
//! streamed. Resources are plain structs holding a shared transport
//! reference; there is no inheritance hierarchy.

pub mod audio;
pub mod chat;
pub mod completions;
pub mod misc;

pub use audio::{Audio, Transcriptions};
pub use chat::{Chat, ChatCompletions};
pub use completions::Completions;
pub use misc::Misc;
