//! Retry Executor Module
//!
//! Runs a fallible async operation under a [`RetryPolicy`].

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{FailureKind, RetryError, RetryPolicy, Transient};

// == Retry State ==
/// Lifecycle of a single [`retry_with_backoff`] call.
///
/// `Succeeded`, `FailedPermanently`, `BudgetExhausted` and `Cancelled` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    Idle,
    Attempting,
    Waiting(Duration),
    Succeeded,
    FailedPermanently,
    BudgetExhausted,
    Cancelled,
}

impl RetryState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RetryState::Succeeded
                | RetryState::FailedPermanently
                | RetryState::BudgetExhausted
                | RetryState::Cancelled
        )
    }
}

// == Retry With Backoff ==
/// Invokes `operation` until it succeeds, fails permanently, runs out of
/// budget, or `cancel` fires.
///
/// `classify` decides whether a failure is worth retrying. On a transient
/// failure the call sleeps for [`RetryPolicy::delay_for_attempt`] before the
/// next attempt; the sleep is raced against `cancel`, and a cancellation
/// aborts before the next attempt runs.
///
/// # Example
/// ```ignore
/// let policy = RetryPolicy::new(4, Duration::from_millis(100));
/// let image = retry_with_backoff(&policy, &token, |e: &GenerationError| e.failure_kind(), || {
///     generator.generate(&prompt)
/// })
/// .await?;
/// ```
pub async fn retry_with_backoff<T, E, Op, Fut, C>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    classify: C,
    mut operation: Op,
) -> Result<T, RetryError<E>>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> FailureKind,
    E: std::fmt::Display,
{
    let started = Instant::now();
    let mut attempts: u32 = 0;
    let mut last_error: Option<E> = None;
    let mut state = RetryState::Idle;

    loop {
        state = match state {
            RetryState::Waiting(delay) => {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!(attempts, state = ?RetryState::Cancelled, "retry cancelled while waiting");
                        return Err(RetryError::Cancelled {
                            attempts,
                            last: last_error,
                        });
                    }
                    _ = tokio::time::sleep(delay) => RetryState::Attempting,
                }
            }
            RetryState::Idle | RetryState::Attempting => {
                if cancel.is_cancelled() {
                    debug!(attempts, "retry cancelled before attempt");
                    return Err(RetryError::Cancelled {
                        attempts,
                        last: last_error,
                    });
                }

                attempts += 1;
                match operation().await {
                    Ok(value) => {
                        debug!(attempts, state = ?RetryState::Succeeded, "operation succeeded");
                        return Ok(value);
                    }
                    Err(err) => match classify(&err) {
                        FailureKind::Permanent => {
                            warn!(attempts, error = %err, state = ?RetryState::FailedPermanently, "permanent failure, not retrying");
                            return Err(RetryError::Permanent {
                                attempt: attempts,
                                source: err,
                            });
                        }
                        FailureKind::Transient => {
                            let delay = policy.delay_for_attempt(attempts);
                            let within_budget = policy.allows_attempt(attempts)
                                && policy.allows_wait(started.elapsed(), delay);

                            if !within_budget {
                                warn!(attempts, error = %err, state = ?RetryState::BudgetExhausted, "retry budget exhausted");
                                return Err(RetryError::Exhausted {
                                    attempts,
                                    last: err,
                                });
                            }

                            debug!(attempts, error = %err, delay_ms = delay.as_millis() as u64, "transient failure, backing off");
                            last_error = Some(err);
                            RetryState::Waiting(delay)
                        }
                    },
                }
            }
            // Terminal outcomes return from the arms above
            RetryState::Succeeded
            | RetryState::FailedPermanently
            | RetryState::BudgetExhausted
            | RetryState::Cancelled => unreachable!("terminal state {:?} stored in retry loop", state),
        };
    }
}

/// [`retry_with_backoff`] using the error type's own [`Transient`]
/// classification.
pub async fn retry_transient<T, E, Op, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    operation: Op,
) -> Result<T, RetryError<E>>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Transient + std::fmt::Display,
{
    retry_with_backoff(policy, cancel, E::failure_kind, operation).await
}
