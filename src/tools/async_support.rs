// src/tools/async_support.rs
//! 重试/退避策略与批处理辅助

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 退避策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    /// Same delay between every attempt
    #[default]
    Fixed,
    /// Delay doubles after every attempt, capped at `max_delay`
    Exponential,
}

/// Delay schedule used between attempts against different endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub strategy: BackoffStrategy,
}

impl RetryPolicy {
    /// 默认上限：30 秒
    pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

    pub fn fixed(delay: Duration) -> Self {
        Self {
            base_delay: delay,
            max_delay: delay.max(Self::DEFAULT_MAX_DELAY),
            strategy: BackoffStrategy::Fixed,
        }
    }

    pub fn exponential(base_delay: Duration, max_delay: Duration) -> Self {
        Self { base_delay, max_delay, strategy: BackoffStrategy::Exponential }
    }

    /// No waiting at all; handy for tests and local nodes.
    pub fn immediate() -> Self {
        Self::fixed(Duration::ZERO)
    }

    /// Delay to wait after the `failures`-th consecutive failure (1-based).
    pub fn delay_after(&self, failures: u32) -> Duration {
        match self.strategy {
            BackoffStrategy::Fixed => self.base_delay.min(self.max_delay),
            BackoffStrategy::Exponential => {
                let exponent = failures.saturating_sub(1).min(31);
                self.base_delay
                    .checked_mul(1u32 << exponent)
                    .unwrap_or(self.max_delay)
                    .min(self.max_delay)
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(Duration::from_millis(2_000))
    }
}

/// Split `items` into consecutive chunks of at most `size` elements.
///
/// A `size` of zero is treated as one.
pub fn batch<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    items.chunks(size.max(1)).map(|c| c.to_vec()).collect()
}
