//! Timeout wrapper for persistence calls.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::errors::{DomainError, DomainResult};

/// Run a store call, failing with [`DomainError::Timeout`] once `limit` elapses
pub(crate) async fn bounded<T, F>(operation: &'static str, limit: Duration, call: F) -> DomainResult<T>
where
    F: Future<Output = DomainResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                operation = operation,
                timeout_ms = limit.as_millis() as u64,
                "Store call timed out"
            );
            Err(DomainError::Timeout {
                operation: operation.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_bounded_times_out() {
        let result: DomainResult<()> = bounded("slow", Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(DomainError::Timeout { operation }) if operation == "slow"));
    }

    #[tokio::test]
    async fn test_bounded_passes_result_through() {
        let result = bounded("fast", Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
