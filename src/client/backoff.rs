use std::time::Duration;

/// Number of attempts made by default for a single request.
pub const DEFAULT_ATTEMPTS: u32 = 5;

/// Base of the exponential backoff used by default.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(1);

/// How many times a request is attempted and how long to wait in between.
///
/// Attempts are numbered from 0. No delay precedes attempt 0; attempt `n` is preceded by
/// `base * 2^n`, so the defaults wait 2, 4, 8 and 16 seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    base: Duration,
}

impl RetryPolicy {
    /// `attempts` is clamped to at least 1.
    pub fn new(attempts: u32, base: Duration) -> Self {
        RetryPolicy {
            attempts: attempts.max(1),
            base,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    /// The delay before attempt `attempt`.
    pub fn delay(&self, attempt: u32) -> Duration {
        match attempt {
            0 => Duration::ZERO,
            n => self.base.saturating_mul(2u32.saturating_pow(n)),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::new(DEFAULT_ATTEMPTS, DEFAULT_BACKOFF_BASE)
    }
}

#[cfg(not(target_family = "wasm"))]
pub(crate) async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await
}

#[cfg(target_family = "wasm")]
pub(crate) async fn sleep(duration: Duration) {
    gloo_timers::future::sleep(duration).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_delays_double() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.attempts(), 5);
        assert_eq!(
            (0..policy.attempts())
                .map(|n| policy.delay(n).as_secs())
                .collect::<Vec<_>>(),
            vec![0, 2, 4, 8, 16]
        );
    }

    #[test]
    fn at_least_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Duration::from_millis(1)).attempts(), 1);
    }

    #[test]
    fn huge_attempt_numbers_saturate() {
        let policy = RetryPolicy::default();
        assert!(policy.delay(64) >= policy.delay(31));
    }
}
