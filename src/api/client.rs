use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::api::{ReportUploader, TransportFailure};
use crate::config::Config;
use crate::upload::Payload;

const REPORTS_ENDPOINT: &str = "api/v1/reports";
const REQUEST_TIMEOUT_SECS: u64 = 60;
const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    detail: String,
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ApiClient {
    pub fn new() -> Result<Self> {
        Self::from_config(Config::load()?)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let cli_version = env!("CARGO_PKG_VERSION");
        let user_agent = format!("reportship/{cli_version}");

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_str(&user_agent).context("Invalid user agent")?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        debug!(
            "ApiClient configured base_url={} key_configured={}",
            config.api_url,
            !config.api_key.is_empty()
        );

        Ok(Self {
            client,
            base_url: config.api_url,
            api_key: config.api_key,
        })
    }

    pub fn build_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    async fn send_report(&self, payload: &Payload) -> Result<(), TransportFailure> {
        let bytes = tokio::fs::read(&payload.source_path)
            .await
            .map_err(|err| TransportFailure {
                status: None,
                message: format!("failed to read {}: {err}", payload.source_path.display()),
            })?;

        let file_name = payload
            .source_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report.xml".to_string());

        let report_part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("text/xml")
            .map_err(|err| TransportFailure {
                status: None,
                message: err.to_string(),
            })?;

        let form = Form::new()
            .text("service", payload.service.clone())
            .text(
                "tags",
                serde_json::to_string(&payload.span_tags).unwrap_or_default(),
            )
            .part("report", report_part);

        let url = self.build_url(REPORTS_ENDPOINT);
        debug!("POST {} ({})", url, payload.source_path.display());

        let response = self
            .client
            .post(&url)
            .header("X-Api-Key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(TransportFailure::from_reqwest)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(TransportFailure {
            status: Some(status.as_u16()),
            message: extract_error_message(&body, status.as_u16()),
        })
    }
}

fn extract_error_message(body: &str, status: u16) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
        let details: Vec<&str> = parsed
            .errors
            .iter()
            .map(|e| e.detail.as_str())
            .filter(|d| !d.is_empty())
            .collect();
        if !details.is_empty() {
            return details.join("; ");
        }
    }

    if body.trim().is_empty() {
        format!("ingestion endpoint returned status {status}")
    } else {
        body.trim().to_string()
    }
}

#[async_trait]
impl ReportUploader for ApiClient {
    async fn upload(&self, payload: &Payload) -> Result<(), TransportFailure> {
        self.send_report(payload).await
    }
}
