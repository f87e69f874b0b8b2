//! Generative-content API client

use std::time::Duration;

use async_trait::async_trait;
use domain::{ProviderDescriptor, ProviderId, ProviderKind};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::{CloudSampling, SamplingConfig};
use crate::error::ProviderError;
use crate::ports::{ExchangeLog, ProviderAdapter};

/// Model used when the configuration names none
pub const DEFAULT_CLOUD_MODEL: &str = "gemini-2.5-flash";

/// Endpoint used when the configuration names none
pub const DEFAULT_ENDPOINT_TEMPLATE: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent";

const UNEXPECTED_FORMAT: &str = "Unexpected response format from API";

/// Adapter for the hosted generative-content API
pub struct CloudGenerativeAdapter {
    client: Client,
    id: ProviderId,
    endpoint: String,
    model: String,
    api_key: SecretString,
    sampling: CloudSampling,
    timeout_ms: u64,
    log: ExchangeLog,
}

impl std::fmt::Debug for CloudGenerativeAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudGenerativeAdapter")
            .field("id", &self.id)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl CloudGenerativeAdapter {
    /// Create an adapter for a cloud-generative descriptor
    pub fn from_descriptor(
        descriptor: &ProviderDescriptor,
        sampling: &SamplingConfig,
    ) -> Result<Self, ProviderError> {
        let ProviderKind::CloudGenerative {
            api_key,
            model,
            endpoint_template,
        } = &descriptor.kind
        else {
            return Err(ProviderError::ClientSetup(format!(
                "provider '{}' is not a cloud-generative provider",
                descriptor.id
            )));
        };

        let client = Client::builder()
            .timeout(Duration::from_millis(sampling.timeout_ms))
            .build()
            .map_err(|e| ProviderError::ClientSetup(e.to_string()))?;

        let endpoint = endpoint_template.replace("{model}", model);

        info!(
            provider = %descriptor.id,
            model = %model,
            "Initialized cloud-generative adapter"
        );

        Ok(Self {
            client,
            id: descriptor.id.clone(),
            endpoint,
            model: model.clone(),
            api_key: api_key.clone(),
            sampling: sampling.cloud.clone(),
            timeout_ms: sampling.timeout_ms,
            log: ExchangeLog::new(),
        })
    }

    /// Resolved endpoint URL (without the credential)
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_request<'a>(&self, prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.sampling.temperature,
                top_k: self.sampling.top_k,
                top_p: self.sampling.top_p,
                max_output_tokens: self.sampling.max_output_tokens,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

fn reply_text(response: GenerateResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .next()?
        .text
}

#[async_trait]
impl ProviderAdapter for CloudGenerativeAdapter {
    #[instrument(skip(self, prompt), fields(provider = %self.id, model = %self.model))]
    async fn send_prompt(&self, prompt: &str) -> Result<String, ProviderError> {
        debug!("Sending request to generative-content API");

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.expose_secret())])
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(e, self.timeout_ms))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::from_transport(e, self.timeout_ms))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .unwrap_or_default()
                .error
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("API error: {}", status.as_u16()));
            warn!(status = %status, error = %message, "Generative-content request failed");
            return Err(ProviderError::Api(message));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::InvalidResponse(format!("Malformed response body: {e}")))?;

        let reply = reply_text(parsed)
            .ok_or_else(|| ProviderError::InvalidResponse(UNEXPECTED_FORMAT.to_string()))?;

        debug!(reply_len = reply.len(), "Generative-content request completed");
        self.log.record(prompt, &reply);
        Ok(reply)
    }

    fn provider_id(&self) -> &ProviderId {
        &self.id
    }

    fn exchange_log(&self) -> &ExchangeLog {
        &self.log
    }
}
