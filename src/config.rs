use anyhow::Result;
use std::fs;

use crate::error::ReportshipError;

pub const DEFAULT_API_URL: &str = "https://intake.reportship.dev";
pub const DEFAULT_MAX_CONCURRENCY: usize = 20;

pub fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn env_api_key() -> Option<String> {
    if let Some(key) = env_var("REPORTSHIP_API_KEY") {
        return Some(key);
    }

    let key_file = env_var("REPORTSHIP_API_KEY_FILE")?;
    let key = fs::read_to_string(key_file).ok()?;
    let key = key.trim().to_string();

    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

/// Endpoint connection settings, resolved from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_key: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        let api_key = env_api_key().ok_or(ReportshipError::ApiKeyNotFound)?;
        let api_url = env_var("REPORTSHIP_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Config { api_url, api_key })
    }
}

/// Per-invocation settings passed into the batch orchestrator. Flag parsing
/// happens in `cli`; this struct is the only configuration the core sees.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub service: String,
    pub env: Option<String>,
    pub dry_run: bool,
    pub tags: Vec<String>,
    pub max_concurrency: usize,
}

impl UploadConfig {
    pub fn validate(&self) -> Result<()> {
        if self.service.trim().is_empty() {
            return Err(ReportshipError::InvalidService.into());
        }
        if self.max_concurrency == 0 {
            return Err(ReportshipError::InvalidConcurrency(self.max_concurrency).into());
        }
        Ok(())
    }
}
