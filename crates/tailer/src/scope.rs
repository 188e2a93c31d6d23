use std::time::Duration;

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::StopReason;

/// Cancellation scope for a follow loop: an explicit cancel signal plus an
/// optional deadline.
///
/// Scopes form a tree. A child is cancelled with its parent and inherits the
/// parent's deadline, while cancelling a child leaves the parent untouched.
#[derive(Debug, Clone, Default)]
pub struct CancelScope {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CancelScope {
    /// An unbounded scope that only ends through [`CancelScope::cancel`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Child scope that additionally ends after `timeout`.
    ///
    /// A timeout too large to represent as an instant adds no deadline.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.child(),
        }
    }

    /// Child scope ending at the earlier of `deadline` and any inherited deadline.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let mut child = self.child();
        child.deadline = Some(match child.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        child
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Non-blocking checkpoint: the reason this scope has ended, if it has.
    pub fn check(&self) -> Option<StopReason> {
        if self.token.is_cancelled() {
            return Some(StopReason::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(StopReason::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the scope is cancelled or its deadline elapses.
    pub async fn done(&self) -> StopReason {
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = self.token.cancelled() => StopReason::Cancelled,
                _ = time::sleep_until(deadline) => StopReason::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                StopReason::Cancelled
            }
        }
    }
}
