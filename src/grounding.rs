//! Client for the GILDA grounding service.
//!
//! Sends free text to `{base_url}/ground` and hands back the raw response.
//! Interpreting the grounding payload is left to the caller.

use serde::Serialize;
use tracing::debug;

use crate::config::GroundingConfig;
use crate::error::Result;
use crate::TARGET_WEB_REQUEST;

#[derive(Debug, Serialize)]
struct GroundRequest<'a> {
    text: &'a str,
}

pub struct GroundingClient {
    client: reqwest::Client,
    endpoint: String,
}

impl GroundingClient {
    pub fn new(config: &GroundingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/ground", config.base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Posts `{"text": text}` once. Non-2xx statuses are returned as-is;
    /// only transport failures and timeouts are errors.
    pub async fn ground(&self, text: &str) -> Result<reqwest::Response> {
        debug!(target: TARGET_WEB_REQUEST, "POST {} ({} bytes of text)", self.endpoint, text.len());
        let response = self
            .client
            .post(&self.endpoint)
            .json(&GroundRequest { text })
            .send()
            .await?;
        debug!(target: TARGET_WEB_REQUEST, "{} answered {}", self.endpoint, response.status());
        Ok(response)
    }
}

/// One-off grounding call against `base_url` with the default timeout.
pub async fn ground(text: &str, base_url: &str) -> Result<reqwest::Response> {
    let config = GroundingConfig {
        base_url: base_url.to_string(),
        ..GroundingConfig::default()
    };
    GroundingClient::new(&config)?.ground(text).await
}
