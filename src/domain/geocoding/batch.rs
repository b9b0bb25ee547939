//! Batch resolution options and results

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::geo::Coordinates;

pub const DEFAULT_CONCURRENCY: usize = 5;
pub const DEFAULT_DELAY_MS: u64 = 200;
pub const DEFAULT_RETRIES: u32 = 1;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Tuning knobs for one batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    /// Chunk size; every member of a chunk runs concurrently
    pub concurrency: usize,
    /// Pause between chunks
    pub delay_ms: u64,
    /// Additional attempts after a timed-out or failed one
    pub retries: u32,
    pub retry_delay_ms: u64,
    /// Per-attempt deadline
    pub timeout_ms: u64,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            delay_ms: DEFAULT_DELAY_MS,
            retries: DEFAULT_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl BatchOptions {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_retry_delay_ms(mut self, retry_delay_ms: u64) -> Self {
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Chunk size, never zero
    pub fn chunk_size(&self) -> usize {
        self.concurrency.max(1)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Outcome for one unique input location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    pub location: String,
    pub result: Option<Coordinates>,
    pub success: bool,
}

impl BatchResult {
    pub fn new(location: impl Into<String>, result: Option<Coordinates>) -> Self {
        let success = result.is_some_and(|coordinates| coordinates.is_valid());

        Self {
            location: location.into(),
            result,
            success,
        }
    }
}

/// Aggregate statistics over a batch run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// Fraction in `0.0..=1.0`; 0 for an empty batch
    pub success_rate: f64,
}

impl BatchSummary {
    pub fn from_results(results: &[BatchResult]) -> Self {
        let total = results.len();
        let successful = results.iter().filter(|r| r.success).count();
        let success_rate = if total == 0 {
            0.0
        } else {
            successful as f64 / total as f64
        };

        Self {
            total,
            successful,
            failed: total - successful,
            success_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = BatchOptions::default();
        assert_eq!(options.concurrency, 5);
        assert_eq!(options.delay(), Duration::from_millis(200));
        assert_eq!(options.retries, 1);
        assert_eq!(options.retry_delay(), Duration::from_secs(1));
        assert_eq!(options.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_zero_concurrency_still_chunks() {
        assert_eq!(BatchOptions::default().with_concurrency(0).chunk_size(), 1);
    }

    #[test]
    fn test_result_success_requires_valid_coordinates() {
        assert!(BatchResult::new("Umeå", Some(Coordinates::new(63.8, 20.3))).success);
        assert!(!BatchResult::new("Umeå", None).success);
        assert!(!BatchResult::new("Umeå", Some(Coordinates::new(f64::NAN, 20.3))).success);
    }

    #[test]
    fn test_summary() {
        let results = vec![
            BatchResult::new("a", Some(Coordinates::new(1.0, 2.0))),
            BatchResult::new("b", Some(Coordinates::new(1.0, 2.0))),
            BatchResult::new("c", None),
        ];

        let summary = BatchSummary::from_results(&results);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 1);
        assert!((summary.success_rate - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchSummary::from_results(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.success_rate, 0.0);
    }
}
