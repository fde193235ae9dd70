//! Fixed-delay polling policy for remote runs.

use std::time::Duration;

use threadbot_types::config::BotConfig;

/// Delay between status polls and the overall wait budget for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` waits for as long as the run takes.
    pub deadline: Option<Duration>,
}

impl PollPolicy {
    pub fn new(interval: Duration, deadline: Option<Duration>) -> Self {
        Self { interval, deadline }
    }

    /// Build from configuration. A deadline of `0` disables it.
    pub fn from_config(config: &BotConfig) -> Self {
        let deadline = match config.run_deadline_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Self::new(Duration::from_millis(config.poll_interval_ms), deadline)
    }

    pub fn deadline_exceeded(&self, elapsed: Duration) -> bool {
        self.deadline.is_some_and(|deadline| elapsed >= deadline)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(2), Some(Duration::from_secs(600)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_config_defaults() {
        assert_eq!(PollPolicy::from_config(&BotConfig::default()), PollPolicy::default());
    }

    #[test]
    fn test_zero_deadline_disables() {
        let config = BotConfig {
            run_deadline_secs: 0,
            ..BotConfig::default()
        };
        let policy = PollPolicy::from_config(&config);
        assert!(policy.deadline.is_none());
        assert!(!policy.deadline_exceeded(Duration::from_secs(86_400)));
    }

    #[test]
    fn test_deadline_exceeded() {
        let policy = PollPolicy::new(Duration::from_millis(10), Some(Duration::from_secs(5)));
        assert!(!policy.deadline_exceeded(Duration::from_secs(4)));
        assert!(policy.deadline_exceeded(Duration::from_secs(5)));
    }
}
