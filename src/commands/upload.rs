use anyhow::Result;
use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{ApiClient, ReportUploader, TransportFailure};
use crate::ci_detection::CiContext;
use crate::config::UploadConfig;
use crate::discover::resolve_report_paths;
use crate::git::GitContext;
use crate::tags::{env_tag_list, merge_span_tags, parse_tag_pairs, TagSources};
use crate::ui::{self, ConsoleReporter, Reporter};
use crate::upload::{run_batch, Payload};
use crate::validate::validate_report;

/// Placeholder sender for dry runs. The orchestrator records every payload
/// before reaching the uploader, so this is never invoked.
struct DryRunUploader;

#[async_trait]
impl ReportUploader for DryRunUploader {
    async fn upload(&self, _payload: &Payload) -> Result<(), TransportFailure> {
        Ok(())
    }
}

pub async fn execute(paths: Vec<PathBuf>, config: UploadConfig, verbose: bool) -> Result<()> {
    config.validate()?;

    let reporter: Arc<dyn Reporter> = Arc::new(ConsoleReporter);

    let uploader: Arc<dyn ReportUploader> = if config.dry_run {
        Arc::new(DryRunUploader)
    } else {
        Arc::new(ApiClient::new()?)
    };

    let candidates = resolve_report_paths(&paths);
    let payloads = build_payloads(&candidates, &config, reporter.as_ref());

    if verbose {
        reporter.info(&format!(
            "found {} candidate report(s), {} valid",
            candidates.len(),
            payloads.len()
        ));
    }

    let total = payloads.len();
    let result = run_batch(uploader, payloads, &config, reporter.clone()).await?;

    ui::batch_summary(
        reporter.as_ref(),
        result.uploaded,
        total,
        result.elapsed,
        config.dry_run,
    );

    Ok(())
}

/// Validates each unique candidate and constructs payloads for the ones
/// that pass, with the merged span tags attached. Invalid or unreadable
/// files are reported and excluded; they never fail the batch.
fn build_payloads(
    candidates: &[PathBuf],
    config: &UploadConfig,
    reporter: &dyn Reporter,
) -> Vec<Payload> {
    let span_tags = merge_span_tags(TagSources {
        vcs: GitContext::detect().tags(),
        ci: CiContext::detect().tags(),
        cli: parse_tag_pairs(&config.tags, reporter),
        env_list: env_tag_list(reporter),
        env_override: config.env.clone(),
    });

    let mut payloads = Vec::with_capacity(candidates.len());

    for path in candidates {
        let content = match fs::read(path) {
            Ok(content) => content,
            Err(err) => {
                reporter.warn(&format!("skipping {}: {err}", path.display()));
                continue;
            }
        };

        if let Err(error) = validate_report(&content) {
            reporter.warn(&format!("skipping invalid {}: {error}", path.display()));
            continue;
        }

        payloads.push(Payload {
            service: config.service.clone(),
            span_tags: span_tags.clone(),
            source_path: path.clone(),
        });
    }

    payloads
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MemoryReporter;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_report(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{content}").unwrap();
        path
    }

    fn upload_config() -> UploadConfig {
        UploadConfig {
            service: "svc".to_string(),
            env: Some("ci".to_string()),
            dry_run: false,
            tags: vec!["team:platform".to_string()],
            max_concurrency: 20,
        }
    }

    #[test]
    fn test_build_payloads_filters_invalid() {
        let dir = TempDir::new().unwrap();
        let good = write_report(&dir, "good.xml", "<testsuites/>");
        let bad = write_report(&dir, "bad.xml", "<html/>");
        let reporter = MemoryReporter::default();

        let payloads = build_payloads(&[good.clone(), bad], &upload_config(), &reporter);

        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].source_path, good);
        assert_eq!(payloads[0].service, "svc");
        assert!(reporter
            .lines()
            .iter()
            .any(|line| line.contains("skipping invalid") && line.contains("bad.xml")));
    }

    #[test]
    fn test_build_payloads_attaches_merged_tags() {
        let dir = TempDir::new().unwrap();
        let good = write_report(&dir, "good.xml", "<testsuite name=\"t\"></testsuite>");
        let reporter = MemoryReporter::default();

        let payloads = build_payloads(&[good], &upload_config(), &reporter);

        let tags = &payloads[0].span_tags;
        assert_eq!(tags.get("team").map(String::as_str), Some("platform"));
        assert_eq!(tags.get("env").map(String::as_str), Some("ci"));
    }
}
