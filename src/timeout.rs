//! Timeout racing for network calls.
//!
//! Every dispatch runs through [`fetch_with_timeout`], which races the
//! network call against a timer and settles with whichever finishes first.
//! The loser of the race is abandoned, not cancelled: a call that outlives
//! its timer keeps running detached on the runtime and its eventual result
//! is discarded.

use std::future::Future;
use std::time::Duration;

use crate::error::{FetchError, Result};

/// Timeout applied when a request does not configure one: 10 seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Race `call` against a timer of length `timeout`.
///
/// Both sides start concurrently. If the call settles first, its outcome
/// is returned unchanged, success or failure. If the timer fires first,
/// the result is [`FetchError::Timeout`] and the call is left running
/// detached with its result discarded.
///
/// A zero-length timer is ready on the very first poll, so it wins unless
/// the call was already complete when the race began.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use fluent_fetch::{fetch_with_timeout, FetchError};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let fast = fetch_with_timeout(async { Ok(7) }, Duration::from_secs(1)).await;
/// assert_eq!(fast.unwrap(), 7);
///
/// let slow = fetch_with_timeout(
///     async {
///         tokio::time::sleep(Duration::from_secs(60)).await;
///         Ok(7)
///     },
///     Duration::from_millis(10),
/// )
/// .await;
/// assert!(matches!(slow, Err(FetchError::Timeout)));
/// # }
/// ```
pub async fn fetch_with_timeout<F, T>(call: F, timeout: Duration) -> Result<T>
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    // Spawning keeps the call alive past the race: dropping the join
    // handle on the timeout branch detaches the task instead of aborting
    // it, so the losing call runs to completion unobserved.
    let mut call = tokio::spawn(call);

    tokio::select! {
        // Poll the call first so an already settled call beats a timer
        // that expires in the same tick.
        biased;
        settled = &mut call => match settled {
            Ok(outcome) => outcome,
            Err(join) => Err(FetchError::Transport(join.to_string())),
        },
        _ = tokio::time::sleep(timeout) => Err(FetchError::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn test_call_outcome_wins_when_faster() {
        let result = fetch_with_timeout(
            async {
                sleep(Duration::from_millis(100)).await;
                Ok("body")
            },
            Duration::from_millis(200),
        )
        .await;
        assert_eq!(result.unwrap(), "body");
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_failure_propagates_unchanged() {
        let result: Result<()> = fetch_with_timeout(
            async {
                sleep(Duration::from_millis(50)).await;
                Err(FetchError::Transport("connection refused".to_string()))
            },
            Duration::from_millis(200),
        )
        .await;
        assert!(matches!(result, Err(FetchError::Transport(msg)) if msg == "connection refused"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_wins_when_call_is_slower() {
        let result: Result<()> = fetch_with_timeout(
            async {
                sleep(Duration::from_secs(60)).await;
                Ok(())
            },
            Duration::from_millis(200),
        )
        .await;
        assert!(matches!(result, Err(FetchError::Timeout)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_fires_immediately() {
        let result: Result<()> = fetch_with_timeout(
            async {
                sleep(Duration::from_millis(1)).await;
                Ok(())
            },
            Duration::ZERO,
        )
        .await;
        assert!(matches!(result, Err(FetchError::Timeout)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_losing_call_keeps_running_detached() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);

        let result: Result<()> = fetch_with_timeout(
            async move {
                sleep(Duration::from_millis(500)).await;
                flag.store(true, Ordering::SeqCst);
                Ok(())
            },
            Duration::from_millis(100),
        )
        .await;

        assert!(matches!(result, Err(FetchError::Timeout)));
        assert!(!finished.load(Ordering::SeqCst));

        // The abandoned call is still on the runtime; once its sleep
        // elapses it completes even though nobody is listening.
        sleep(Duration::from_millis(500)).await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_call_reports_transport_error() {
        let result: Result<()> =
            fetch_with_timeout(async { panic!("boom") }, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(FetchError::Transport(_))));
    }
}
