//! OpenAI-compatible chat-completions client

use std::time::Duration;

use async_trait::async_trait;
use domain::{ProviderDescriptor, ProviderId, ProviderKind};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::{LocalSampling, SamplingConfig};
use crate::error::ProviderError;
use crate::ports::{ExchangeLog, ProviderAdapter};

/// Server URL used when the configuration names none
pub const DEFAULT_LOCAL_URL: &str = "http://localhost:1234";

const UNEXPECTED_FORMAT: &str = "Unexpected response format from local inference server";

/// Adapter for a local chat-completions server
#[derive(Debug)]
pub struct LocalInferenceAdapter {
    client: Client,
    id: ProviderId,
    base_url: String,
    model: String,
    sampling: LocalSampling,
    timeout_ms: u64,
    log: ExchangeLog,
}

impl LocalInferenceAdapter {
    /// Create an adapter for a local-inference descriptor
    pub fn from_descriptor(
        descriptor: &ProviderDescriptor,
        sampling: &SamplingConfig,
    ) -> Result<Self, ProviderError> {
        let ProviderKind::LocalInference { base_url, model } = &descriptor.kind else {
            return Err(ProviderError::ClientSetup(format!(
                "provider '{}' is not a local-inference provider",
                descriptor.id
            )));
        };

        let client = Client::builder()
            .timeout(Duration::from_millis(sampling.timeout_ms))
            .build()
            .map_err(|e| ProviderError::ClientSetup(e.to_string()))?;

        info!(
            provider = %descriptor.id,
            base_url = %base_url,
            model = %model,
            "Initialized local-inference adapter"
        );

        Ok(Self {
            client,
            id: descriptor.id.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.clone(),
            sampling: sampling.local.clone(),
            timeout_ms: sampling.timeout_ms,
            log: ExchangeLog::new(),
        })
    }

    /// Chat-completions endpoint URL
    pub fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn build_request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatRequestMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.sampling.temperature,
            top_p: self.sampling.top_p,
            max_tokens: self.sampling.max_tokens,
            stream: false,
        }
    }

    fn map_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_connect() {
            ProviderError::Unreachable {
                url: self.base_url.clone(),
            }
        } else {
            ProviderError::from_transport(err, self.timeout_ms)
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatRequestMessage<'a>>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatRequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Error payloads seen from OpenAI-compatible servers
#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorField>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Detailed { message: Option<String> },
    Plain(String),
}

impl ErrorEnvelope {
    fn into_message(self) -> Option<String> {
        let nested = match self.error {
            Some(ErrorField::Detailed { message }) => message,
            Some(ErrorField::Plain(message)) => Some(message),
            None => None,
        };
        nested.or(self.message)
    }
}

#[async_trait]
impl ProviderAdapter for LocalInferenceAdapter {
    #[instrument(skip(self, prompt), fields(provider = %self.id, model = %self.model))]
    async fn send_prompt(&self, prompt: &str) -> Result<String, ProviderError> {
        debug!(url = %self.completions_url(), "Sending request to local inference server");

        let response = self
            .client
            .post(self.completions_url())
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_error(e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .unwrap_or_default()
                .into_message()
                .unwrap_or_else(|| format!("API error: {}", status.as_u16()));
            warn!(status = %status, error = %message, "Local inference request failed");
            return Err(ProviderError::Api(message));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::InvalidResponse(format!("Malformed response body: {e}")))?;

        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| {
                warn!(body = %body, "Unexpected local inference response");
                ProviderError::InvalidResponse(UNEXPECTED_FORMAT.to_string())
            })?;

        debug!(reply_len = reply.len(), "Local inference request completed");
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
