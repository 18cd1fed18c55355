//! Token ring configuration.

use std::time::Duration;

/// Configuration for a token ring run.
#[derive(Debug, Clone)]
pub struct TokenRingConfig {
    /// How long a process occupies the critical section once it enters.
    pub critical_section: Duration,

    /// Abort the pass if it has not completed within this time.
    ///
    /// `None` waits for completion indefinitely.
    pub pass_timeout: Option<Duration>,
}

impl Default for TokenRingConfig {
    fn default() -> Self {
        Self {
            critical_section: Duration::from_secs(1),
            pass_timeout: None,
        }
    }
}

impl TokenRingConfig {
    /// Set the critical-section occupation time.
    pub fn with_critical_section(mut self, critical_section: Duration) -> Self {
        self.critical_section = critical_section;
        self
    }

    /// Set the pass timeout.
    pub fn with_pass_timeout(mut self, timeout: Duration) -> Self {
        self.pass_timeout = Some(timeout);
        self
    }
}
