//! HTTP client for the generation API.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::instrument;

use gnosis_core::error::GenerationError;
use gnosis_core::model::{GenerationRequest, GenerationResult};
use gnosis_core::parser::{error_message_from_body, parse_generation_response};
use gnosis_core::traits::GenerationClient;

/// Default timeout for one generation request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Client for the `/generate` endpoint.
pub struct HttpGenerationClient {
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpGenerationClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_form(request: &GenerationRequest) -> Result<Form, GenerationError> {
        let mut form = Form::new()
            .text("mode", request.mode.to_string())
            .text("user_request", request.user_request.clone())
            .text("topic", request.topic.clone().unwrap_or_default());

        if let Some(text) = request.text_input.as_deref().filter(|t| !t.is_empty()) {
            form = form.text("text_input", text.to_string());
        }

        if let Some(file) = &request.file {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone())
                .mime_str("application/pdf")
                .map_err(|e| GenerationError::InvalidRequest(e.to_string()))?;
            form = form.part("file", part);
        }

        Ok(form)
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, request), fields(mode = %request.mode, has_file = request.file.is_some()))]
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        request.validate()?;
        let start = Instant::now();
        let form = Self::build_form(request)?;

        let response = self
            .client
            .post(format!("{}/generate", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout(self.timeout_secs)
                } else {
                    GenerationError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Network(format!("failed to read response: {e}")))?;
        let latency_ms = start.elapsed().as_millis() as u64;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), latency_ms, "generation request failed");
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: error_message_from_body(&body),
            });
        }

        let result = parse_generation_response(&body)?;
        tracing::info!(
            mode = %result.mode(),
            questions = result.quiz().map(|q| q.total()).unwrap_or(0),
            latency_ms,
            "generation complete"
        );
        Ok(result)
    }
}
