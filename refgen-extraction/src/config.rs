//! Configuration for retry behavior and stream extraction.

/// Configuration for the blocking-mode retry loop.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of generation attempts before giving up (default: 3).
    pub max_attempts: usize,
    /// Maximum characters of an invalid reply echoed back into the next
    /// prompt (default: 2000).
    pub max_echoed_reply_chars: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            max_echoed_reply_chars: 2000,
        }
    }
}

impl RetryConfig {
    /// Set the maximum number of generation attempts.
    #[must_use]
    pub const fn with_max_attempts(mut self, max: usize) -> Self {
        self.max_attempts = max;
        self
    }

    /// Set the echoed-reply truncation limit.
    #[must_use]
    pub const fn with_max_echoed_reply_chars(mut self, chars: usize) -> Self {
        self.max_echoed_reply_chars = chars;
        self
    }
}

/// Configuration for stream extraction.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Bounded channel size for emitted record events (default: 100).
    pub channel_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 100,
        }
    }
}

impl StreamConfig {
    /// Set the emitted-event channel capacity.
    #[must_use]
    pub const fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }
}
