use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Linear backoff: the `attempt`-th retry (1-based) waits `base * attempt`.
pub fn linear_backoff(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(attempt)
}

/// Sleeps for `delay`. Returns `false` when cancelled first.
pub(crate) async fn pause(cancel: &CancellationToken, delay: Duration) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_linearly() {
        let base = Duration::from_millis(1000);
        assert_eq!(linear_backoff(base, 1), Duration::from_millis(1000));
        assert_eq!(linear_backoff(base, 3), Duration::from_millis(3000));
    }

    #[tokio::test]
    async fn pause_returns_early_when_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(!pause(&cancel, Duration::from_secs(60)).await);
    }
}
