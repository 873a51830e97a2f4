//! Typed streaming sequences decoded from SSE response bodies.

mod sse;

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::{Stream, StreamExt};
use serde::de::DeserializeOwned;

use crate::error::EdgenError;
use crate::utils::cancel::CancelHandle;
use sse::{SseDecoder, SseFrame};

/// A typed, forward-only sequence of streamed chunks.
///
/// Yields chunks strictly in server emission order and ends after the
/// server's `[DONE]` terminator. The sequence is single-pass: consuming it
/// takes ownership, so a second decode of the same connection cannot be
/// expressed. Dropping the stream closes the underlying connection.
///
/// A connection that closes mid-frame yields a
/// [`EdgenError::Stream`] truncation error, and a frame whose payload is not
/// valid JSON for `T` yields a [`EdgenError::Decode`] error and terminates
/// the sequence; chunks are order-dependent, so decoding never skips a bad
/// frame and continues.
pub struct ChunkStream<T> {
    inner: Pin<Box<dyn Stream<Item = Result<T, EdgenError>> + Send>>,
}

impl<T> Stream for ChunkStream<T> {
    type Item = Result<T, EdgenError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl<T> std::fmt::Debug for ChunkStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkStream").finish_non_exhaustive()
    }
}

enum Step<I> {
    Cancelled,
    Source(I),
}

impl<T> ChunkStream<T>
where
    T: DeserializeOwned + Send + 'static,
{
    /// Decode a raw byte stream into typed chunks.
    pub(crate) fn from_byte_stream<S, B, E>(source: S, cancel: Option<CancelHandle>) -> Self
    where
        S: Stream<Item = Result<B, E>> + Send + Unpin + 'static,
        B: AsRef<[u8]> + Send,
        E: std::fmt::Display + Send,
    {
        let cancel = cancel.unwrap_or_default();
        let stream = async_stream::stream! {
            let mut source = source;
            let mut decoder = SseDecoder::new();

            loop {
                let step = tokio::select! {
                    _ = cancel.cancelled() => Step::Cancelled,
                    item = source.next() => Step::Source(item),
                };

                let item = match step {
                    Step::Cancelled => {
                        yield Err(EdgenError::UserAbort);
                        return;
                    }
                    Step::Source(item) => item,
                };

                match item {
                    Some(Ok(bytes)) => {
                        for frame in decoder.feed(bytes.as_ref()) {
                            match frame {
                                SseFrame::Done => return,
                                SseFrame::Data(payload) => {
                                    match serde_json::from_str::<T>(&payload) {
                                        Ok(chunk) => yield Ok(chunk),
                                        Err(e) => {
                                            yield Err(EdgenError::decode(format!(
                                                "invalid SSE frame payload: {e}"
                                            )));
                                            return;
                                        }
                                    }
                                }
                            }
                        }
                    }
                    Some(Err(e)) => {
                        yield Err(EdgenError::stream(format!(
                            "response body failed mid-stream: {e}"
                        )));
                        return;
                    }
                    None => {
                        if decoder.has_partial_frame() {
                            yield Err(EdgenError::stream(
                                "connection closed mid-frame before the event terminator",
                            ));
                        }
                        return;
                    }
                }
            }
        };

        Self {
            inner: Box::pin(stream),
        }
    }
}
