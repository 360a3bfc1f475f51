//! Cooperative cancellation for in-flight fetches
//!
//! A `CancelToken` is handed to every fetch function started by a
//! coordinator. The coordinator cancels the token when a newer request for
//! the same key supersedes the fetch; the fetch may check the token at its
//! own pace, and any result produced under a cancelled token is discarded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

/// Error returned by [`CancelToken::checkpoint`] once cancellation was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("request was cancelled")]
pub struct Cancelled;

/// Clonable cancellation token shared between a coordinator and its fetch
///
/// All clones observe a `cancel()` issued on any of them. Cancellation is
/// cooperative: nothing is forcibly terminated, the holder of the token is
/// expected to notice and stop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the not-cancelled state
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Requests cancellation; visible to all clones of this token
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns `Err(Cancelled)` once cancellation has been requested
    ///
    /// Convenience for fetch functions that want to bail out early between
    /// steps via `?`.
    pub fn checkpoint(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}
