//! Retry policy for claim submission.
//!
//! Bounded exponential backoff with a visible attempt counter; retries
//! never recurse, the coordinator re-picks due records from the store.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Claim retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial backoff duration
    pub initial_backoff: Duration,
    /// Maximum backoff duration
    pub max_backoff: Duration,
    /// Backoff multiplier for exponential growth
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(60),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Calculate backoff duration for a given attempt (0-indexed)
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let backoff_secs =
            self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(attempt as i32);
        let capped = backoff_secs.min(self.max_backoff.as_secs_f64());
        Duration::from_secs_f64(capped)
    }

    /// Check if another attempt is allowed
    pub fn should_retry(&self, attempts: u32) -> bool {
        attempts < self.max_retries
    }

    /// Calculate the next retry time for a given attempt
    pub fn next_retry_after(&self, attempt: u32) -> DateTime<Utc> {
        let backoff = self.backoff_for_attempt(attempt);
        Utc::now() + chrono::Duration::from_std(backoff).unwrap_or(chrono::Duration::seconds(60))
    }
}

/// Classifies claim errors for retry decisions
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorClass {
    /// Temporary failure - should retry (RPC timeout, network issues)
    Transient,
    /// The message identity was already claimed - treat as success
    AlreadyProcessed,
    /// Permanent failure - do not retry (invalid params, contract error)
    Permanent,
    /// Unknown error - may retry with backoff
    Unknown,
}

/// Classify an error message for retry decisions
pub fn classify_error(error: &str) -> ErrorClass {
    let error_lower = error.to_lowercase();

    if error_lower.contains("already processed") || error_lower.contains("already claimed") {
        return ErrorClass::AlreadyProcessed;
    }

    // "already known" is the mempool rejecting a duplicate tx, not
    // evidence the claim executed
    if error_lower.contains("already known")
        || error_lower.contains("timeout")
        || error_lower.contains("connection")
        || error_lower.contains("network")
        || error_lower.contains("rate limit")
        || error_lower.contains("too many requests")
        || error_lower.contains("503")
        || error_lower.contains("502")
        || error_lower.contains("temporarily unavailable")
    {
        return ErrorClass::Transient;
    }

    if error_lower.contains("invalid")
        || error_lower.contains("unauthorized")
        || error_lower.contains("insufficient locked balance")
        || error_lower.contains("execution reverted")
    {
        return ErrorClass::Permanent;
    }

    ErrorClass::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_exponentially_and_caps() {
        let config = RetryConfig::default();
        assert_eq!(config.backoff_for_attempt(0), Duration::from_secs(2));
        assert_eq!(config.backoff_for_attempt(1), Duration::from_secs(4));
        assert_eq!(config.backoff_for_attempt(2), Duration::from_secs(8));
        // 2 * 2^10 = 2048s, capped at 60s
        assert_eq!(config.backoff_for_attempt(10), Duration::from_secs(60));
    }

    #[test]
    fn retry_budget_is_bounded() {
        let config = RetryConfig {
            max_retries: 3,
            ..Default::default()
        };
        assert!(config.should_retry(0));
        assert!(config.should_retry(2));
        assert!(!config.should_retry(3));
        assert!(!config.should_retry(100));
    }

    #[test]
    fn next_retry_is_in_the_future() {
        let config = RetryConfig::default();
        assert!(config.next_retry_after(0) > Utc::now());
    }

    #[test]
    fn classifies_already_processed() {
        assert_eq!(
            classify_error("Message already processed: 0xabc"),
            ErrorClass::AlreadyProcessed
        );
        assert_eq!(
            classify_error("message already claimed"),
            ErrorClass::AlreadyProcessed
        );
    }

    #[test]
    fn classifies_transient_errors() {
        assert_eq!(classify_error("request timeout"), ErrorClass::Transient);
        assert_eq!(
            classify_error("Connection refused (os error 111)"),
            ErrorClass::Transient
        );
        assert_eq!(classify_error("HTTP 503"), ErrorClass::Transient);
        assert_eq!(
            classify_error("tx already known to the pool"),
            ErrorClass::Transient
        );
    }

    #[test]
    fn classifies_permanent_errors() {
        assert_eq!(
            classify_error("execution reverted: Unauthorized"),
            ErrorClass::Permanent
        );
        assert_eq!(classify_error("invalid message id"), ErrorClass::Permanent);
    }

    #[test]
    fn unknown_errors_fall_through() {
        assert_eq!(classify_error("something odd"), ErrorClass::Unknown);
    }
}
