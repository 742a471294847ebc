use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Semaphore};

use crate::api::ReportUploader;
use crate::config::UploadConfig;
use crate::ui::Reporter;
use crate::upload::retry::{upload_with_retry, RetryPolicy, UploadOutcome};
use crate::upload::{ClassifiedError, Payload};

/// Aggregate outcome of one orchestrator invocation. Skipped files are
/// reported through the sink but excluded from the count.
#[derive(Debug)]
pub struct BatchResult {
    pub uploaded: usize,
    pub elapsed: Duration,
}

pub async fn run_batch(
    uploader: Arc<dyn ReportUploader>,
    payloads: Vec<Payload>,
    config: &UploadConfig,
    reporter: Arc<dyn Reporter>,
) -> Result<BatchResult> {
    run_batch_with_policy(uploader, payloads, config, reporter, RetryPolicy::default()).await
}

/// Schedules payloads through a semaphore-gated worker pool. At most
/// `max_concurrency` uploads are in flight; a new one starts as soon as a
/// permit frees. The first fatal outcome sets the abort flag: tasks that
/// have not acquired a permit yet return without uploading, in-flight ones
/// run to completion, and the fatal error is propagated as the batch error.
pub async fn run_batch_with_policy(
    uploader: Arc<dyn ReportUploader>,
    payloads: Vec<Payload>,
    config: &UploadConfig,
    reporter: Arc<dyn Reporter>,
    policy: RetryPolicy,
) -> Result<BatchResult> {
    let started = Instant::now();

    let semaphore = Arc::new(Semaphore::new(config.max_concurrency));
    let aborted = Arc::new(AtomicBool::new(false));
    let fatal: Arc<Mutex<Option<ClassifiedError>>> = Arc::new(Mutex::new(None));
    let uploaded = Arc::new(AtomicUsize::new(0));
    let policy = Arc::new(policy);
    let dry_run = config.dry_run;

    let mut tasks = Vec::with_capacity(payloads.len());

    for payload in payloads {
        let semaphore = semaphore.clone();
        let aborted = aborted.clone();
        let fatal = fatal.clone();
        let uploaded = uploaded.clone();
        let uploader = uploader.clone();
        let reporter = reporter.clone();
        let policy = policy.clone();

        tasks.push(tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire().await else {
                return;
            };
            if aborted.load(Ordering::SeqCst) {
                return;
            }

            if dry_run {
                reporter.info(&format!(
                    "[dry-run] would upload {}",
                    payload.source_path.display()
                ));
                uploaded.fetch_add(1, Ordering::SeqCst);
                return;
            }

            match upload_with_retry(uploader.as_ref(), &payload, &policy, reporter.as_ref()).await
            {
                UploadOutcome::Uploaded => {
                    uploaded.fetch_add(1, Ordering::SeqCst);
                    reporter.info(&format!("uploaded {}", payload.source_path.display()));
                }
                UploadOutcome::Skipped(error) => {
                    reporter.warn(&format!(
                        "skipping {} after attempt {}: {}",
                        payload.source_path.display(),
                        error.attempt,
                        error.message
                    ));
                }
                UploadOutcome::Fatal(error) => {
                    aborted.store(true, Ordering::SeqCst);
                    reporter.error(&format!(
                        "upload of {} failed: {}",
                        payload.source_path.display(),
                        error.message
                    ));
                    let mut slot = fatal.lock().await;
                    slot.get_or_insert(error);
                }
            }
        }));
    }

    for task in tasks {
        task.await.context("upload task panicked")?;
    }

    let result = BatchResult {
        uploaded: uploaded.load(Ordering::SeqCst),
        elapsed: started.elapsed(),
    };

    if let Some(error) = fatal.lock().await.take() {
        anyhow::bail!("batch aborted: {}", error.message);
    }

    Ok(result)
}
