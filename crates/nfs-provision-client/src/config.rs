//! Client configuration types.

use governor::Quota;
use std::num::NonZeroU32;

/// Throttle for outgoing control-plane commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Sustained commands per second
    pub requests_per_second: u32,

    /// Commands allowed in a burst
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimitConfig {
    /// Ten commands per second with a burst of ten
    #[must_use]
    pub const fn new() -> Self {
        Self {
            requests_per_second: 10,
            burst: 10,
        }
    }

    /// Set the sustained rate
    #[must_use]
    pub const fn requests_per_second(mut self, rate: u32) -> Self {
        self.requests_per_second = rate;
        self
    }

    /// Set the burst size
    #[must_use]
    pub const fn burst(mut self, burst: u32) -> Self {
        self.burst = burst;
        self
    }

    /// The governor quota; zero values are clamped to one
    #[must_use]
    pub fn quota(&self) -> Quota {
        let rate = NonZeroU32::new(self.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(self.burst).unwrap_or(NonZeroU32::MIN);
        Quota::per_second(rate).allow_burst(burst)
    }
}
