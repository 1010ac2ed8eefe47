//! Exponential backoff for transient failures.
//!
//! Shared by the page fetcher and by supplier order placement; each error
//! type decides for itself which failures are transient.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Errors that can tell whether another attempt might succeed.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// On a transient error the function sleeps for `backoff_base_secs * 2^attempt`
/// seconds and tries again, up to `max_retries` additional attempts after the
/// first try. Non-transient errors are returned immediately. `label` names the
/// operation in log lines.
///
/// With `max_retries = 3` the operation is attempted at most 4 times total.
///
/// # Errors
///
/// Returns the first non-transient error, or the last transient error once
/// retries are exhausted.
pub async fn retry_with_backoff<T, E, F, Fut>(
    label: &str,
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, E>
where
    E: Transient + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !err.is_transient() || attempt >= max_retries {
            return Err(err);
        }

        // Cap the shift so extreme configs cannot overflow.
        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            operation = label,
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
