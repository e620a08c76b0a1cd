//! Retry Error Module
//!
//! Terminal outcomes of a retried operation and failure classification.

use std::fmt::Display;

use thiserror::Error;

// == Failure Kind ==
/// How a failure of the wrapped operation should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Expected to clear up on its own (rate limit, network blip)
    Transient,
    /// Retrying cannot help (invalid input, rejected request)
    Permanent,
}

/// Default classification for error types used with
/// [`retry_transient`](super::retry_transient).
pub trait Transient {
    fn is_transient(&self) -> bool;

    fn failure_kind(&self) -> FailureKind {
        if self.is_transient() {
            FailureKind::Transient
        } else {
            FailureKind::Permanent
        }
    }
}

// == Retry Error ==
/// Why a retried operation did not produce a value.
///
/// `Exhausted` is distinct from `Permanent` so callers can tell
/// "gave up" from "the operation failed irrecoverably".
#[derive(Error, Debug)]
pub enum RetryError<E> {
    /// The operation failed with a non-retryable error
    #[error("permanent failure on attempt {attempt}: {source}")]
    Permanent {
        attempt: u32,
        #[source]
        source: E,
    },

    /// Every allowed attempt failed transiently
    #[error("retry budget exhausted after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: E,
    },

    /// The caller cancelled before the next attempt ran
    #[error("cancelled after {attempts} attempts{}", last_failure_suffix(.last))]
    Cancelled {
        attempts: u32,
        #[source]
        last: Option<E>,
    },
}

fn last_failure_suffix<E: Display>(last: &Option<E>) -> String {
    match last {
        Some(err) => format!(": {}", err),
        None => String::new(),
    }
}

impl<E> RetryError<E> {
    /// Number of times the operation was invoked.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Permanent { attempt, .. } => *attempt,
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::Cancelled { attempts, .. } => *attempts,
        }
    }

    /// The last error returned by the operation, if it ran at all.
    pub fn into_inner(self) -> Option<E> {
        match self {
            RetryError::Permanent { source, .. } => Some(source),
            RetryError::Exhausted { last, .. } => Some(last),
            RetryError::Cancelled { last, .. } => last,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetryError::Cancelled { .. })
    }
}
