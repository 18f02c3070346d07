//! Gotenberg LibreOffice conversion client.
//!
//! Posts the original file as multipart field `files` to
//! `/forms/libreoffice/convert` and returns the PDF response body.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::{Duration, Instant};
use tracing::debug;

use docvault_core::{defaults, ConversionOptions, Error, PreviewConverter, Result};

const CONVERT_PATH: &str = "/forms/libreoffice/convert";
const OUTPUT_FILENAME_HEADER: &str = "Gotenberg-Output-Filename";

pub struct GotenbergClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl GotenbergClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(defaults::CONVERSION_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn form(file_name: &str, data: Vec<u8>, options: &ConversionOptions) -> Form {
        let mut form = Form::new()
            .part("files", Part::bytes(data).file_name(file_name.to_string()))
            .text("singlePageSheets", options.single_page_sheets.to_string())
            .text("updateIndexes", "false")
            .text("exportFormFields", "false")
            .text("exportBookmarks", "false");
        if options.landscape {
            form = form.text("landscape", "true");
        }
        form
    }
}

#[async_trait]
impl PreviewConverter for GotenbergClient {
    async fn convert_to_pdf(
        &self,
        file_name: &str,
        data: Vec<u8>,
        options: &ConversionOptions,
    ) -> Result<Vec<u8>> {
        let start = Instant::now();
        let input_len = data.len();
        let url = format!("{}{}", self.base_url, CONVERT_PATH);

        let response = self
            .client
            .post(&url)
            .header(OUTPUT_FILENAME_HEADER, options.output_name.as_str())
            .multipart(Self::form(file_name, data, options))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                Error::DependencyUnavailable(format!("Conversion request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::DependencyUnavailable(format!(
                "Conversion service returned {}: {}",
                status, body
            )));
        }

        let pdf = response.bytes().await.map_err(|e| {
            Error::DependencyUnavailable(format!("Failed to read conversion response: {}", e))
        })?;

        debug!(
            subsystem = "jobs",
            component = "gotenberg",
            op = "convert",
            file_name,
            input_len,
            byte_count = pdf.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Converted document to PDF"
        );
        Ok(pdf.to_vec())
    }
}
