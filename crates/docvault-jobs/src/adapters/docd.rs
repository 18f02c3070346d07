//! docd text extraction client.
//!
//! docd accepts the file as multipart field `input` on `/convert` and
//! answers with JSON carrying the extracted `body`, or a non-empty `error`.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

use docvault_core::{defaults, Error, Result, TextExtractor};

#[derive(Debug, Deserialize)]
struct DocdResponse {
    #[serde(default)]
    body: String,
    #[serde(default)]
    meta: HashMap<String, serde_json::Value>,
    #[serde(default)]
    msecs: u64,
    #[serde(default)]
    error: String,
}

pub struct DocdClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl DocdClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(defaults::EXTRACTION_TIMEOUT_SECS),
        }
    }
}

#[async_trait]
impl TextExtractor for DocdClient {
    async fn extract_text(&self, file_name: &str, data: Vec<u8>) -> Result<String> {
        let start = Instant::now();
        let url = format!("{}/convert", self.base_url);
        let form = Form::new().part("input", Part::bytes(data).file_name(file_name.to_string()));

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                Error::DependencyUnavailable(format!("Extraction request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::DependencyUnavailable(format!(
                "Extraction service returned {}: {}",
                status, body
            )));
        }

        let result: DocdResponse = response.json().await.map_err(|e| {
            Error::DependencyUnavailable(format!("Failed to parse extraction response: {}", e))
        })?;

        if !result.error.is_empty() {
            return Err(Error::DependencyUnavailable(format!(
                "Extraction failed: {}",
                result.error
            )));
        }

        debug!(
            subsystem = "jobs",
            component = "docd",
            op = "extract",
            file_name,
            text_len = result.body.len(),
            meta_keys = result.meta.len(),
            service_ms = result.msecs,
            duration_ms = start.elapsed().as_millis() as u64,
            "Extracted text"
        );
        Ok(result.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_defaults() {
        let parsed: DocdResponse = serde_json::from_str(r#"{"body":"hello"}"#).unwrap();
        assert_eq!(parsed.body, "hello");
        assert!(parsed.error.is_empty());
        assert!(parsed.meta.is_empty());
    }
}
