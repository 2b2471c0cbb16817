//! Pool configuration.

pub mod pool;

pub use pool::{PoolConfig, PoolMode};
