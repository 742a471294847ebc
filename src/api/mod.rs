pub mod client;

pub use client::ApiClient;

use async_trait::async_trait;
use std::fmt;

use crate::upload::Payload;

/// Outcome of a single failed transport attempt. Raw reqwest errors are
/// converted to this shape once at the client boundary; nothing downstream
/// inspects transport internals.
#[derive(Debug, Clone)]
pub struct TransportFailure {
    /// Absent when the failure never reached a response (connection error,
    /// timeout).
    pub status: Option<u16>,
    pub message: String,
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {status}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl TransportFailure {
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        let message = if err.is_connect() {
            format!("cannot connect to ingestion endpoint: {err}")
        } else if err.is_timeout() {
            format!("request timed out: {err}")
        } else {
            err.to_string()
        };

        Self {
            status: err.status().map(|s| s.as_u16()),
            message,
        }
    }
}

/// Abstract sender the orchestrator schedules against. One call per payload.
#[async_trait]
pub trait ReportUploader: Send + Sync {
    async fn upload(&self, payload: &Payload) -> Result<(), TransportFailure>;
}
