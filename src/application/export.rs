use std::time::Duration;

use tracing::debug;

use crate::domain::{AppError, DownloadRequest, EXPORT_DELAY};

/// Simulated export: holds the request for a fixed delay, then releases it.
///
/// Its completion is what moves the trigger back to idle, so a real export
/// pipeline can replace it without touching the UI contract.
#[derive(Debug, Clone, Copy)]
pub struct ExportJob {
    delay: Duration,
}

impl Default for ExportJob {
    fn default() -> Self {
        Self::new(EXPORT_DELAY)
    }
}

impl ExportJob {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    // Not cancellable: once started the timer always fires.
    pub async fn run(self, request: DownloadRequest) -> Result<DownloadRequest, AppError> {
        debug!(delay_ms = self.delay.as_millis() as u64, "Export job running");
        tokio::time::sleep(self.delay).await;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[test]
    fn test_default_delay() {
        assert_eq!(ExportJob::default().delay(), Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_returns_request_after_delay() {
        let request = DownloadRequest {
            source_url: "https://example.com/v1.mp4".to_string(),
        };
        let started = Instant::now();

        let result = ExportJob::new(Duration::from_millis(500))
            .run(request.clone())
            .await;

        assert_eq!(result, Ok(request));
        assert_eq!(started.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_finished_before_delay() {
        let request = DownloadRequest {
            source_url: "https://example.com/v1.mp4".to_string(),
        };
        let job = tokio::spawn(ExportJob::default().run(request));

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert!(!job.is_finished());

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(job.await.unwrap().is_ok());
    }
}
