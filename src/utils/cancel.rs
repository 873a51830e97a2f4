//! Cancellation handles.
//!
//! One [`CancelHandle`] covers one logical API call: it aborts an in-flight
//! send, a pending backoff sleep between retries, and a live chunk stream.
//! Cancelling is idempotent, and a cancelled call always resolves to
//! [`EdgenError::UserAbort`](crate::error::EdgenError::UserAbort) rather than
//! hanging.

use tokio_util::sync::CancellationToken;

/// A handle that can be used to request cancellation of a call.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    /// Create a new cancel handle.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Request cancellation. The call observing this handle stops as soon as
    /// possible; dropping a cancelled stream closes the underlying HTTP
    /// connection so the server stops generating tokens.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A future that resolves when cancellation is requested.
    pub fn cancelled(&self) -> tokio_util::sync::WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}
