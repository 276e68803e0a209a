//! Configuration for the monitor.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SarissaError};

/// Configuration for a [`Monitor`](crate::monitor::Monitor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Queries slower than this (in milliseconds) are written to the slow log.
    pub slow_log_limit_ms: u64,

    /// Split top-level disjunctions into separately presearched pieces.
    pub decompose_queries: bool,

    /// Evaluate candidate queries on a thread pool.
    pub parallel: bool,

    /// Thread pool size for parallel evaluation.
    /// If None, uses the number of CPU cores.
    pub thread_pool_size: Option<usize>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            slow_log_limit_ms: 2000,
            decompose_queries: true,
            parallel: false,
            thread_pool_size: None,
        }
    }
}

impl MonitorConfig {
    /// Set the slow log threshold.
    pub fn with_slow_log_limit_ms(mut self, limit: u64) -> Self {
        self.slow_log_limit_ms = limit;
        self
    }

    /// Enable or disable query decomposition.
    pub fn with_decompose_queries(mut self, decompose: bool) -> Self {
        self.decompose_queries = decompose;
        self
    }

    /// Enable or disable parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the thread pool size used when parallel evaluation is on.
    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }

    /// Check the configuration for values the monitor cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.thread_pool_size == Some(0) {
            return Err(SarissaError::invalid_config(
                "thread_pool_size must be positive",
            ));
        }
        Ok(())
    }

    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: MonitorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MonitorConfig::default();
        assert_eq!(config.slow_log_limit_ms, 2000);
        assert!(config.decompose_queries);
        assert!(!config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_pool() {
        let config = MonitorConfig::default()
            .with_parallel(true)
            .with_thread_pool_size(0);
        assert!(matches!(
            config.validate(),
            Err(SarissaError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = MonitorConfig::from_json(r#"{"parallel": true}"#).unwrap();
        assert!(config.parallel);
        assert_eq!(config.slow_log_limit_ms, 2000);
        assert_eq!(config.thread_pool_size, None);

        let json = config.to_json().unwrap();
        assert_eq!(MonitorConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(
            MonitorConfig::from_json("{not json"),
            Err(SarissaError::Json(_))
        ));
        assert!(matches!(
            MonitorConfig::from_json(r#"{"thread_pool_size": 0}"#),
            Err(SarissaError::InvalidArgument(_))
        ));
    }
}
