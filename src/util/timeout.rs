//! Timeout helper.

use std::future::Future;
use std::time::Duration;

use crate::error::LocalGenError;

/// Wrap a future with a timeout.
pub async fn with_timeout<T>(
    duration: Duration,
    future: impl Future<Output = Result<T, LocalGenError>>,
) -> Result<T, LocalGenError> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(LocalGenError::Timeout(duration.as_millis() as u64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn slow_future_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, LocalGenError>(())
        };
        let err = with_timeout(Duration::from_secs(3), slow).await.unwrap_err();
        assert!(matches!(err, LocalGenError::Timeout(3000)));
    }

    #[tokio::test]
    async fn fast_future_passes_through() {
        let value = with_timeout(Duration::from_secs(1), async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }
}
