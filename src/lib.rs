//! # edgen
//!
//! Async Rust client for the [Edgen](https://edgen.co) inference server
//! API: chat completions, text completions, audio transcription, and
//! server version info, over the server's OpenAI-compatible HTTP surface.
//!
//! Every call goes through one shared transport that handles JSON and
//! multipart request building, per-request timeouts, automatic retry with
//! exponential backoff and jitter, a typed error taxonomy, cancellation,
//! and incremental SSE decoding for streamed responses.
//!
//! ## Buffered calls
//!
//! ```rust,no_run
//! use edgen::Edgen;
//! use edgen::types::chat::{ChatCompletionCreateParams, ChatCompletionMessageParam};
//!
//! # async fn run() -> Result<(), edgen::EdgenError> {
//! let client = Edgen::new()?;
//! let completion = client
//!     .chat()
//!     .completions()
//!     .create(ChatCompletionCreateParams::new(
//!         "default",
//!         vec![ChatCompletionMessageParam::user("Say this is a test")],
//!     ))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Streaming
//!
//! ```rust,no_run
//! use edgen::Edgen;
//! use edgen::types::chat::{ChatCompletionCreateParams, ChatCompletionMessageParam};
//! use futures_util::StreamExt;
//!
//! # async fn run() -> Result<(), edgen::EdgenError> {
//! let client = Edgen::new()?;
//! let mut stream = client
//!     .chat()
//!     .completions()
//!     .create_stream(ChatCompletionCreateParams::new(
//!         "default",
//!         vec![ChatCompletionMessageParam::user("Say this is a test")],
//!     ))
//!     .await?;
//! while let Some(chunk) = stream.next().await {
//!     let chunk = chunk?;
//!     if let Some(delta) = &chunk.choices[0].delta.content {
//!         print!("{delta}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
#![deny(unsafe_code)]

pub mod client;
mod config;
pub mod error;
mod http;
pub mod resources;
pub mod retry;
pub mod streaming;
pub mod types;
pub mod uploads;
pub mod utils;

pub use client::{Edgen, EdgenBuilder};
pub use error::{ApiErrorBody, EdgenError};
pub use http::RequestOptions;
pub use http::promise::{ApiPromise, RawResponse, StreamPromise};
pub use retry::RetryPolicy;
pub use streaming::ChunkStream;
pub use uploads::Uploadable;
pub use utils::cancel::CancelHandle;
