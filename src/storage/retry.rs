use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use super::StorageError;

// ============================================================================
// Storage Read Retry - exponential backoff for transient failures
// ============================================================================
//
// Read-only storage calls (menu lookup, tracking status, totals) retry on
// transient failures. Writes never go through here; the order commit
// transaction runs exactly once.
//
// ============================================================================

#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first call
    pub max_attempts: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
            multiplier: 2.0,
        }
    }
}

/// Execute a read-only storage call, retrying transient failures with
/// exponential backoff. Permanent failures return immediately.
pub async fn retry_read<F, Fut, T>(
    config: &RetryConfig,
    operation: &str,
    mut call: F,
) -> Result<T, StorageError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StorageError>>,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        attempt += 1;

        match call().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(operation, attempt, "storage read succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) if error.is_transient() && attempt < config.max_attempts => {
                tracing::warn!(
                    operation,
                    attempt,
                    error = %error,
                    delay_ms = delay.as_millis() as u64,
                    "transient storage failure, retrying after delay"
                );

                sleep(delay).await;

                delay = Duration::from_millis(
                    ((delay.as_millis() as f64) * config.multiplier) as u64,
                );
                delay = delay.min(config.max_delay);
            }
            Err(error) => {
                tracing::error!(operation, attempt, error = %error, "storage read failed");
                return Err(error);
            }
        }
    }
}
