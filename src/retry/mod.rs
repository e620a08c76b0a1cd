//! Retry Module
//!
//! Exponential backoff with jitter for calls to rate-limited services.
//!
//! A call is driven by [`retry_with_backoff`]: the caller passes a
//! [`RetryPolicy`], a [`CancellationToken`](tokio_util::sync::CancellationToken),
//! a classifier and the operation, and gets back either the value or a
//! [`RetryError`] saying whether the failure was permanent, the budget ran
//! out, or the call was cancelled.

mod error;
mod executor;
mod policy;

pub use error::{FailureKind, RetryError, Transient};
pub use executor::{retry_transient, retry_with_backoff, RetryState};
pub use policy::RetryPolicy;
