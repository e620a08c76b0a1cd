//! Retry Policy Module
//!
//! Backoff schedule and retry budget for [`retry_with_backoff`](super::retry_with_backoff).

use std::time::Duration;

use crate::error::{AppError, Result};

// == Retry Policy ==
/// Exponential backoff configuration.
///
/// The wait after the `n`-th failed attempt is
/// `min(max_delay, base_delay * multiplier^(n-1))`, optionally perturbed by
/// jitter and capped again.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts allowed, including the first
    pub max_attempts: u32,
    /// Wall-clock budget measured from the first attempt
    pub max_elapsed: Option<Duration>,
    /// Wait before the second attempt
    pub base_delay: Duration,
    /// Growth factor applied after each failed attempt
    pub multiplier: f64,
    /// Ceiling on any single wait
    pub max_delay: Option<Duration>,
    /// Jitter ratio in `[0, 1]`; each wait is scaled by a uniform factor
    /// in `[1 - jitter, 1 + jitter]`
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            max_elapsed: None,
            base_delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_delay: Some(Duration::from_secs(60)),
            jitter: 0.1,
        }
    }
}

impl RetryPolicy {
    // == Constructor ==
    /// Creates a policy with the given attempt budget and base delay,
    /// doubling with no cap and no jitter.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            max_elapsed: None,
            base_delay,
            multiplier: 2.0,
            max_delay: None,
            jitter: 0.0,
        }
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    pub fn with_max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.max_elapsed = Some(max_elapsed);
        self
    }

    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    // == Validate ==
    /// Rejects settings that would make the schedule meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(AppError::InvalidConfig(
                "retry max_attempts must be at least 1".to_string(),
            ));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(AppError::InvalidConfig(format!(
                "retry multiplier must be >= 1.0, got {}",
                self.multiplier
            )));
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(AppError::InvalidConfig(format!(
                "retry jitter must be within [0, 1], got {}",
                self.jitter
            )));
        }
        if let Some(max_delay) = self.max_delay {
            if max_delay < self.base_delay {
                return Err(AppError::InvalidConfig(
                    "retry max_delay must not be below base_delay".to_string(),
                ));
            }
        }
        Ok(())
    }

    // == Delay Schedule ==
    /// Returns the un-jittered wait after `failed_attempts` failures (1-based).
    pub fn base_delay_for_attempt(&self, failed_attempts: u32) -> Duration {
        let exponent = failed_attempts.saturating_sub(1).min(i32::MAX as u32) as i32;
        let nanos = self.base_delay.as_nanos() as f64 * self.multiplier.powi(exponent);
        self.cap(duration_from_nanos_f64(nanos))
    }

    /// Returns the wait after `failed_attempts` failures with jitter applied.
    pub fn delay_for_attempt(&self, failed_attempts: u32) -> Duration {
        let delay = self.base_delay_for_attempt(failed_attempts);
        if self.jitter <= 0.0 {
            return delay;
        }

        // Uniform in [1 - jitter, 1 + jitter]
        let factor = 1.0 + self.jitter * (2.0 * rand::random::<f64>() - 1.0);
        let nanos = delay.as_nanos() as f64 * factor;
        self.cap(duration_from_nanos_f64(nanos))
    }

    // == Budget ==
    /// Whether another attempt is allowed after `attempts` have run.
    pub fn allows_attempt(&self, attempts: u32) -> bool {
        attempts < self.max_attempts
    }

    /// Whether waiting `delay` on top of `elapsed` stays within the time budget.
    pub fn allows_wait(&self, elapsed: Duration, delay: Duration) -> bool {
        match self.max_elapsed {
            Some(budget) => elapsed.saturating_add(delay) <= budget,
            None => true,
        }
    }

    fn cap(&self, delay: Duration) -> Duration {
        match self.max_delay {
            Some(max) => delay.min(max),
            None => delay,
        }
    }
}

/// Converts fractional nanoseconds, saturating to `Duration::MAX`.
fn duration_from_nanos_f64(nanos: f64) -> Duration {
    if nanos.is_nan() || nanos <= 0.0 {
        Duration::ZERO
    } else if nanos >= u64::MAX as f64 {
        Duration::MAX
    } else {
        Duration::from_nanos(nanos.round() as u64)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_default_is_valid() {
        assert!(RetryPolicy::default().validate().is_ok());
    }

    #[test]
    fn test_exponential_schedule() {
        let policy = RetryPolicy::new(4, Duration::from_millis(100));

        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(400));
    }

    #[test]
    fn test_schedule_respects_max_delay() {
        let policy = RetryPolicy::new(10, Duration::from_millis(100))
            .with_multiplier(3.0)
            .with_max_delay(Duration::from_millis(500));

        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(300));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(500));
        assert_eq!(policy.delay_for_attempt(30), Duration::from_millis(500));
    }

    #[test]
    fn test_huge_attempt_saturates_without_cap() {
        let policy = RetryPolicy::new(10, Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(u32::MAX), Duration::MAX);
    }

    #[test]
    fn test_jitter_stays_within_band() {
        let policy = RetryPolicy::new(10, Duration::from_millis(1000)).with_jitter(0.25);

        for _ in 0..200 {
            let delay = policy.delay_for_attempt(1);
            assert!(delay >= Duration::from_millis(750), "{:?}", delay);
            assert!(delay <= Duration::from_millis(1250), "{:?}", delay);
        }
    }

    #[test]
    fn test_jitter_never_exceeds_max_delay() {
        let policy = RetryPolicy::new(10, Duration::from_millis(100))
            .with_max_delay(Duration::from_millis(400))
            .with_jitter(1.0);

        for _ in 0..200 {
            assert!(policy.delay_for_attempt(5) <= Duration::from_millis(400));
        }
    }

    #[test]
    fn test_attempt_budget() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        assert!(policy.allows_attempt(0));
        assert!(policy.allows_attempt(2));
        assert!(!policy.allows_attempt(3));
    }

    #[test]
    fn test_elapsed_budget() {
        let policy = RetryPolicy::new(10, Duration::from_millis(10))
            .with_max_elapsed(Duration::from_secs(1));

        assert!(policy.allows_wait(Duration::from_millis(500), Duration::from_millis(500)));
        assert!(!policy.allows_wait(Duration::from_millis(900), Duration::from_millis(200)));
        assert!(RetryPolicy::new(1, Duration::ZERO).allows_wait(Duration::MAX, Duration::MAX));
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let base = RetryPolicy::new(3, Duration::from_millis(100));

        assert!(RetryPolicy::new(0, Duration::from_millis(100)).validate().is_err());
        assert!(base.clone().with_multiplier(0.5).validate().is_err());
        assert!(base.clone().with_multiplier(f64::NAN).validate().is_err());
        assert!(base.clone().with_jitter(1.5).validate().is_err());
        assert!(base.clone().with_jitter(-0.1).validate().is_err());
        assert!(base
            .clone()
            .with_max_delay(Duration::from_millis(50))
            .validate()
            .is_err());
        assert!(base.with_multiplier(1.0).validate().is_ok());
    }
}
