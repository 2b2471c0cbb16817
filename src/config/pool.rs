//! Pool mode and tunables.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Operating mode of the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolMode {
    /// Worker count is constant from `start` to shutdown.
    Fixed,
    /// Worker count grows on backlog up to `max_workers` and shrinks back to
    /// `initial_workers` when workers idle past `idle_limit`.
    Cached,
}

/// Default number of initial workers: one per hardware thread.
fn default_initial_workers() -> usize {
    num_cpus::get()
}

/// Default task queue capacity.
fn default_queue_capacity() -> usize {
    1024
}

/// Default worker ceiling for cached mode.
fn default_max_workers() -> usize {
    100
}

/// Default idle time before a surplus cached-mode worker retires: 10 seconds.
fn default_idle_limit_ms() -> u64 {
    10_000
}

/// Default bounded wait inside `submit` before overflow is reported: 1 second.
fn default_submit_wait_ms() -> u64 {
    1_000
}

fn default_mode() -> PoolMode {
    PoolMode::Fixed
}

/// Configuration for a [`WorkerPool`](crate::WorkerPool).
///
/// All values can be set builder-style before the pool is constructed, or
/// through the pool's setters before `start`. Once the pool is running the
/// configuration is frozen.
///
/// # Example
///
/// ```rust
/// use flexpool::config::{PoolConfig, PoolMode};
///
/// let config = PoolConfig::new()
///     .with_mode(PoolMode::Cached)
///     .with_initial_workers(2)
///     .with_max_workers(8)
///     .with_queue_capacity(256);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Operating mode. Default: [`PoolMode::Fixed`].
    #[serde(default = "default_mode")]
    pub mode: PoolMode,

    /// Workers spawned by `start`.
    ///
    /// Default: `num_cpus::get()`.
    #[serde(default = "default_initial_workers")]
    pub initial_workers: usize,

    /// Maximum number of queued tasks before `submit` reports overflow.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Worker ceiling. Effective only in cached mode.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Idle time after which a surplus cached-mode worker retires, in
    /// milliseconds.
    #[serde(default = "default_idle_limit_ms")]
    pub idle_limit_ms: u64,

    /// How long `submit` waits for queue space before reporting overflow, in
    /// milliseconds.
    #[serde(default = "default_submit_wait_ms")]
    pub submit_wait_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            initial_workers: default_initial_workers(),
            queue_capacity: default_queue_capacity(),
            max_workers: default_max_workers(),
            idle_limit_ms: default_idle_limit_ms(),
            submit_wait_ms: default_submit_wait_ms(),
        }
    }
}

impl PoolConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the operating mode.
    #[must_use]
    pub fn with_mode(mut self, mode: PoolMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the number of workers spawned by `start`.
    #[must_use]
    pub fn with_initial_workers(mut self, count: usize) -> Self {
        self.initial_workers = count;
        self
    }

    /// Set the task queue capacity.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the cached-mode worker ceiling.
    #[must_use]
    pub fn with_max_workers(mut self, count: usize) -> Self {
        self.max_workers = count;
        self
    }

    /// Set the cached-mode idle limit in milliseconds.
    #[must_use]
    pub fn with_idle_limit_ms(mut self, ms: u64) -> Self {
        self.idle_limit_ms = ms;
        self
    }

    /// Set the bounded submit wait in milliseconds.
    #[must_use]
    pub fn with_submit_wait_ms(mut self, ms: u64) -> Self {
        self.submit_wait_ms = ms;
        self
    }

    /// Idle limit as a `Duration`.
    #[must_use]
    pub fn idle_limit(&self) -> Duration {
        Duration::from_millis(self.idle_limit_ms)
    }

    /// Submit wait as a `Duration`.
    #[must_use]
    pub fn submit_wait(&self) -> Duration {
        Duration::from_millis(self.submit_wait_ms)
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.initial_workers == 0 {
            return Err("initial_workers must be greater than 0".into());
        }
        if self.queue_capacity == 0 {
            return Err("queue_capacity must be greater than 0".into());
        }
        if self.max_workers == 0 {
            return Err("max_workers must be greater than 0".into());
        }
        if self.max_workers < self.initial_workers {
            return Err("max_workers must be at least initial_workers".into());
        }
        if self.submit_wait_ms == 0 {
            return Err("submit_wait_ms must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse a configuration from a JSON string and validate it.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: PoolConfig =
            serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = PoolConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.mode, PoolMode::Fixed);
        assert_eq!(cfg.queue_capacity, 1024);
        assert_eq!(cfg.max_workers, 100);
        assert_eq!(cfg.idle_limit(), Duration::from_secs(10));
        assert_eq!(cfg.submit_wait(), Duration::from_secs(1));
    }

    #[test]
    fn builder_methods_apply() {
        let cfg = PoolConfig::new()
            .with_mode(PoolMode::Cached)
            .with_initial_workers(2)
            .with_max_workers(8)
            .with_queue_capacity(16)
            .with_idle_limit_ms(500)
            .with_submit_wait_ms(100);
        assert_eq!(cfg.mode, PoolMode::Cached);
        assert_eq!(cfg.initial_workers, 2);
        assert_eq!(cfg.max_workers, 8);
        assert_eq!(cfg.queue_capacity, 16);
        assert_eq!(cfg.idle_limit_ms, 500);
        assert_eq!(cfg.submit_wait_ms, 100);
    }

    #[test]
    fn zero_values_rejected() {
        assert!(PoolConfig::new().with_initial_workers(0).validate().is_err());
        assert!(PoolConfig::new().with_queue_capacity(0).validate().is_err());
        assert!(PoolConfig::new().with_max_workers(0).validate().is_err());
        assert!(PoolConfig::new().with_submit_wait_ms(0).validate().is_err());
    }

    #[test]
    fn max_below_initial_rejected() {
        let cfg = PoolConfig::new().with_initial_workers(8).with_max_workers(4);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn from_json_applies_defaults() {
        let cfg = PoolConfig::from_json_str(r#"{"mode": "cached", "max_workers": 8}"#).unwrap();
        assert_eq!(cfg.mode, PoolMode::Cached);
        assert_eq!(cfg.max_workers, 8);
        assert_eq!(cfg.queue_capacity, 1024);
    }

    #[test]
    fn from_json_rejects_invalid() {
        assert!(PoolConfig::from_json_str(r#"{"queue_capacity": 0}"#).is_err());
        assert!(PoolConfig::from_json_str("not json").is_err());
    }
}
