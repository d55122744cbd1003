pub mod async_support;
pub mod serdes;

pub use async_support::{batch, BackoffStrategy, RetryPolicy};
