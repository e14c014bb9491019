use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};

use crate::config::OpenAiConfig;

/// Shared HTTP client for the OpenAI API.
///
/// Built once by the process entry point and handed to both adapters.
#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build OpenAI HTTP client")?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_config(cfg: &OpenAiConfig) -> Result<Self> {
        Self::new(cfg.api_key.clone(), cfg.base_url.clone(), cfg.timeout())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(super) fn post(&self, path: &str) -> RequestBuilder {
        self.http
            .post(format!("{}/{}", self.base_url, path.trim_start_matches('/')))
            .bearer_auth(&self.api_key)
    }
}
