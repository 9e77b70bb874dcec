//! Caller-owned execution context bounding a single call.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::ClientError;

/// Cancellation flag and optional deadline for API calls.
///
/// Clones share the cancellation flag, so a context can be cancelled from
/// another thread while a call holds a clone of it.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use hetzner_dns::Context;
///
/// let ctx = Context::with_timeout(Duration::from_secs(2));
/// assert!(!ctx.is_cancelled());
///
/// ctx.clone().cancel();
/// assert!(ctx.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A context whose deadline is `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancelled: Arc::default(),
            deadline: Some(deadline),
        }
    }

    /// Cancels the context and all of its clones.
    ///
    /// Calls waiting on a response return [ClientError::Cancelled] shortly after.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether this context or one of its clones was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// The deadline, if the context has one.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the time left for a request, or why none should be sent.
    ///
    /// `None` means no deadline was set.
    pub(crate) fn remaining(&self) -> Result<Option<Duration>, ClientError> {
        if self.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        match self.deadline {
            None => Ok(None),
            Some(deadline) => match deadline.checked_duration_since(Instant::now()) {
                Some(left) if !left.is_zero() => Ok(Some(left)),
                _ => Err(ClientError::DeadlineExceeded),
            },
        }
    }
}
