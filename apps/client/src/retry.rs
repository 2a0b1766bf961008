//! Retry policy for rating submissions lost to network failures.

use std::time::Duration;

use tokio::task::AbortHandle;
use uuid::Uuid;

/// Delay before a failed rating is sent again.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Fixed-delay retry, unbounded in attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn fixed(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_RETRY_DELAY)
    }
}

/// Handle to the one scheduled retry of a session.
///
/// At most one exists per session; replacing or cancelling it aborts the
/// background task.
#[derive(Debug)]
pub struct PendingRetry {
    pub id: u64,
    pub card_id: Uuid,
    handle: AbortHandle,
}

impl PendingRetry {
    pub fn new(id: u64, card_id: Uuid, handle: AbortHandle) -> Self {
        Self {
            id,
            card_id,
            handle,
        }
    }

    pub fn cancel(self) {
        tracing::debug!(card_id = %self.card_id, retry_id = self.id, "cancelling pending retry");
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_delay_is_five_seconds() {
        assert_eq!(RetryPolicy::default().delay, Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_aborts_the_task() {
        let policy = RetryPolicy::default();
        let task = tokio::spawn(async move {
            tokio::time::sleep(policy.delay).await;
        });

        let pending = PendingRetry::new(1, Uuid::new_v4(), task.abort_handle());
        pending.cancel();

        let err = task.await.unwrap_err();
        assert!(err.is_cancelled());
    }
}
