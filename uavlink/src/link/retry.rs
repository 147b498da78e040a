//! Reconnect policy for the mover's connect loop.

use std::time::Duration;

/// Default delay between failed connection attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Default cap for exponential backoff (5 minutes).
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(300);

/// How the delay grows between consecutive failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backoff {
    /// Same delay after every failure.
    #[default]
    Fixed,
    /// Delay doubles with each consecutive failure, up to `max_delay`.
    Exponential,
}

impl std::str::FromStr for Backoff {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed" => Ok(Backoff::Fixed),
            "exponential" => Ok(Backoff::Exponential),
            other => Err(format!("unknown backoff '{}'", other)),
        }
    }
}

impl std::fmt::Display for Backoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backoff::Fixed => write!(f, "fixed"),
            Backoff::Exponential => write!(f, "exponential"),
        }
    }
}

/// Retry policy for failed connection attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay after the first failure.
    pub initial_delay: Duration,

    /// Give up after this many consecutive failures. `None` retries forever.
    pub max_attempts: Option<u32>,

    /// Delay growth.
    pub backoff: Backoff,

    /// Upper bound for exponential backoff.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_RETRY_DELAY,
            max_attempts: None,
            backoff: Backoff::Fixed,
            max_delay: DEFAULT_MAX_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// Fixed delay, retry forever.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            initial_delay: delay,
            ..Default::default()
        }
    }

    /// Limit the number of consecutive failures.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Use exponential backoff capped at `max_delay`.
    pub fn exponential(mut self, max_delay: Duration) -> Self {
        self.backoff = Backoff::Exponential;
        self.max_delay = max_delay;
        self
    }

    /// Delay to wait after `consecutive_failures` failures (1-based).
    pub fn delay_for(&self, consecutive_failures: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.initial_delay,
            Backoff::Exponential => {
                let exponent = consecutive_failures.saturating_sub(1).min(20);
                self.initial_delay
                    .saturating_mul(2u32.saturating_pow(exponent))
                    .min(self.max_delay)
            }
        }
    }

    /// Returns true once `consecutive_failures` reaches the attempt limit.
    pub fn is_exhausted(&self, consecutive_failures: u32) -> bool {
        self.max_attempts
            .is_some_and(|max| consecutive_failures >= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_fixed_five_seconds_forever() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(5));
        assert_eq!(policy.delay_for(100), Duration::from_secs(5));
        assert!(!policy.is_exhausted(u32::MAX));
    }

    #[test]
    fn test_exponential_backoff() {
        let policy = RetryPolicy::fixed(Duration::from_secs(1)).exponential(DEFAULT_MAX_BACKOFF);
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
        assert_eq!(policy.delay_for(4), Duration::from_secs(8));
        assert_eq!(policy.delay_for(10), Duration::from_secs(300)); // 512 > 300
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_secs(300));
    }

    #[test]
    fn test_max_attempts() {
        let policy = RetryPolicy::default().with_max_attempts(3);
        assert!(!policy.is_exhausted(2));
        assert!(policy.is_exhausted(3));
    }

    #[test]
    fn test_backoff_parse() {
        assert_eq!("fixed".parse::<Backoff>().unwrap(), Backoff::Fixed);
        assert_eq!(
            " Exponential ".parse::<Backoff>().unwrap(),
            Backoff::Exponential
        );
        assert!("linear".parse::<Backoff>().is_err());
    }
}
