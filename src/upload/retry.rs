use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

use crate::api::{ReportUploader, TransportFailure};
use crate::ui::Reporter;
use crate::upload::Payload;

/// 1 initial attempt + 5 retries.
pub const MAX_ATTEMPTS: u32 = 6;
const BASE_DELAY_MS: u64 = 500;
const MAX_DELAY_MS: u64 = 10_000;

/// Statuses that stop the whole batch. A strict subset of the no-retry set:
/// 413 is also never retried but only skips the one oversized file.
const BATCH_FATAL_STATUSES: &[u16] = &[400, 403];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Retryable,
    NonRetryableSkip,
    NonRetryableAbort,
}

#[derive(Debug, Clone)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub message: String,
    /// Which attempt produced it, 1-based.
    pub attempt: u32,
}

/// Maps a transport failure to retry/skip/abort. A failure that never
/// reached a response is always retryable.
pub fn classify(failure: &TransportFailure) -> ErrorKind {
    match failure.status {
        None => ErrorKind::Retryable,
        Some(status) if BATCH_FATAL_STATUSES.contains(&status) => ErrorKind::NonRetryableAbort,
        Some(413) => ErrorKind::NonRetryableSkip,
        Some(_) => ErrorKind::Retryable,
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay: Duration::from_millis(BASE_DELAY_MS),
            max_delay: Duration::from_millis(MAX_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// No sleeping between attempts; for tests.
    pub fn immediate() -> Self {
        Self {
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let backoff = (self.base_delay.as_millis() as u64).saturating_mul(2_u64.pow(exponent));
        let capped = backoff.min(self.max_delay.as_millis() as u64);
        let jitter = if capped > 0 {
            rand::thread_rng().gen_range(0..=capped / 4)
        } else {
            0
        };
        Duration::from_millis(capped + jitter)
    }
}

/// Terminal outcome for one payload.
#[derive(Debug)]
pub enum UploadOutcome {
    Uploaded,
    Skipped(ClassifiedError),
    Fatal(ClassifiedError),
}

/// Drives a single payload through bounded retry. Emits one retry notice
/// per failed retryable attempt, in attempt order. Budget exhaustion without
/// a fatal status ever observed terminates as Skip.
pub async fn upload_with_retry(
    uploader: &dyn ReportUploader,
    payload: &Payload,
    policy: &RetryPolicy,
    reporter: &dyn Reporter,
) -> UploadOutcome {
    let mut attempt = 1u32;

    loop {
        match uploader.upload(payload).await {
            Ok(()) => return UploadOutcome::Uploaded,
            Err(failure) => {
                let kind = classify(&failure);
                let error = ClassifiedError {
                    kind,
                    message: failure.to_string(),
                    attempt,
                };

                match kind {
                    ErrorKind::Retryable if attempt < policy.max_attempts => {
                        reporter.warn(&format!(
                            "retrying {} (attempt {}/{}): {}",
                            payload.source_path.display(),
                            attempt,
                            policy.max_attempts,
                            failure
                        ));
                        sleep(policy.delay_for(attempt)).await;
                        attempt += 1;
                    }
                    ErrorKind::NonRetryableAbort => return UploadOutcome::Fatal(error),
                    _ => return UploadOutcome::Skipped(error),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MemoryReporter;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn payload(name: &str) -> Payload {
        Payload {
            service: "svc".to_string(),
            span_tags: HashMap::new(),
            source_path: PathBuf::from(name),
        }
    }

    fn failure(status: Option<u16>) -> TransportFailure {
        TransportFailure {
            status,
            message: "boom".to_string(),
        }
    }

    /// Fails every attempt with a fixed status, counting calls.
    struct AlwaysFailing {
        status: Option<u16>,
        calls: AtomicU32,
    }

    impl AlwaysFailing {
        fn new(status: Option<u16>) -> Self {
            Self {
                status,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ReportUploader for AlwaysFailing {
        async fn upload(&self, _payload: &Payload) -> Result<(), TransportFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(failure(self.status))
        }
    }

    /// Fails n times, then succeeds.
    struct FlakyUploader {
        failures_remaining: AtomicU32,
    }

    #[async_trait]
    impl ReportUploader for FlakyUploader {
        async fn upload(&self, _payload: &Payload) -> Result<(), TransportFailure> {
            let remaining = self.failures_remaining.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
                return Err(failure(Some(500)));
            }
            Ok(())
        }
    }

    #[test]
    fn test_classification_table() {
        assert_eq!(classify(&failure(None)), ErrorKind::Retryable);
        assert_eq!(classify(&failure(Some(400))), ErrorKind::NonRetryableAbort);
        assert_eq!(classify(&failure(Some(403))), ErrorKind::NonRetryableAbort);
        assert_eq!(classify(&failure(Some(413))), ErrorKind::NonRetryableSkip);
        assert_eq!(classify(&failure(Some(500))), ErrorKind::Retryable);
        assert_eq!(classify(&failure(Some(429))), ErrorKind::Retryable);
        assert_eq!(classify(&failure(Some(404))), ErrorKind::Retryable);
    }

    #[test]
    fn test_delay_grows_and_caps() {
        let policy = RetryPolicy::default();
        let first = policy.delay_for(1);
        assert!(first >= Duration::from_millis(500));
        // capped regardless of attempt number, jitter at most 25%
        let late = policy.delay_for(40);
        assert!(late <= Duration::from_millis(12_500));
    }

    #[tokio::test]
    async fn test_status_500_exhausts_six_attempts_then_skips() {
        let uploader = AlwaysFailing::new(Some(500));
        let reporter = MemoryReporter::default();

        let outcome = upload_with_retry(
            &uploader,
            &payload("a.xml"),
            &RetryPolicy::immediate(),
            &reporter,
        )
        .await;

        assert_eq!(uploader.calls.load(Ordering::SeqCst), 6);
        match outcome {
            UploadOutcome::Skipped(error) => {
                assert_eq!(error.attempt, 6);
                assert_eq!(error.kind, ErrorKind::Retryable);
            }
            other => panic!("expected Skipped, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_retry_notices_in_attempt_order() {
        let uploader = AlwaysFailing::new(None);
        let reporter = MemoryReporter::default();

        upload_with_retry(
            &uploader,
            &payload("a.xml"),
            &RetryPolicy::immediate(),
            &reporter,
        )
        .await;

        let lines = reporter.lines();
        assert_eq!(lines.len(), 5);
        for (i, line) in lines.iter().enumerate() {
            assert!(
                line.contains(&format!("attempt {}/6", i + 1)),
                "line {i}: {line}"
            );
        }
    }

    #[tokio::test]
    async fn test_403_never_retried_and_fatal() {
        let uploader = AlwaysFailing::new(Some(403));
        let reporter = MemoryReporter::default();

        let outcome = upload_with_retry(
            &uploader,
            &payload("a.xml"),
            &RetryPolicy::immediate(),
            &reporter,
        )
        .await;

        assert_eq!(uploader.calls.load(Ordering::SeqCst), 1);
        assert!(reporter.lines().is_empty());
        match outcome {
            UploadOutcome::Fatal(error) => assert_eq!(error.attempt, 1),
            other => panic!("expected Fatal, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_413_never_retried_but_only_skips() {
        let uploader = AlwaysFailing::new(Some(413));
        let reporter = MemoryReporter::default();

        let outcome = upload_with_retry(
            &uploader,
            &payload("big.xml"),
            &RetryPolicy::immediate(),
            &reporter,
        )
        .await;

        assert_eq!(uploader.calls.load(Ordering::SeqCst), 1);
        match outcome {
            UploadOutcome::Skipped(error) => {
                assert_eq!(error.kind, ErrorKind::NonRetryableSkip);
                assert_eq!(error.attempt, 1);
            }
            other => panic!("expected Skipped, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transient_failure_then_success() {
        let uploader = FlakyUploader {
            failures_remaining: AtomicU32::new(2),
        };
        let reporter = MemoryReporter::default();

        let outcome = upload_with_retry(
            &uploader,
            &payload("a.xml"),
            &RetryPolicy::immediate(),
            &reporter,
        )
        .await;

        assert!(matches!(outcome, UploadOutcome::Uploaded));
        assert_eq!(reporter.lines().len(), 2);
    }
}
