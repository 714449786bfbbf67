//! HTTP invoker speaking the OpenAI-compatible chat completions protocol.
//!
//! All five supported providers expose (or are addressed through) an
//! OpenAI-compatible `/chat/completions` endpoint; the per-provider base URL
//! and API-key environment variable live on [`Provider`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::backend::{ChatMessage, ModelInvoker};
use crate::error::{Result, SurecallError};
use crate::registry::ModelHandle;
use crate::schema::SchemaDescriptor;

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct JsonSchemaSpec {
    name: String,
    schema: Value,
    strict: bool,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    json_schema: Option<JsonSchemaSpec>,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ApiMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

/// A [`ModelInvoker`] backed by `reqwest`.
///
/// Credentials are read per call from the provider's environment variable
/// (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, ...); a missing key is reported as
/// model-unavailable so the engine terminates to the default without burning
/// further attempts.
pub struct HttpInvoker {
    client: reqwest::Client,
    temperature: f32,
    max_tokens: Option<u32>,
    timeout: Option<Duration>,
}

impl Default for HttpInvoker {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpInvoker {
    pub fn new() -> Self {
        debug!("creating HTTP invoker with default configuration");
        Self {
            client: reqwest::Client::new(),
            temperature: 0.0,
            max_tokens: None,
            timeout: None,
        }
    }

    /// Set the sampling temperature (0.0 to 1.0, lower = more deterministic).
    #[instrument(skip(self))]
    pub fn temperature(mut self, temperature: f32) -> Self {
        debug!(
            previous_temp = self.temperature,
            new_temp = temperature,
            "Setting temperature"
        );
        self.temperature = temperature;
        self
    }

    /// Set the maximum tokens to generate.
    #[instrument(skip(self))]
    pub fn max_tokens(mut self, max: u32) -> Self {
        debug!(previous_max = ?self.max_tokens, new_max = max, "Setting max_tokens");
        self.max_tokens = Some(max.max(1));
        self
    }

    /// Set a per-request timeout.
    ///
    /// The engine itself enforces no deadline; a hung call would otherwise
    /// starve the retry cycle indefinitely, so production callers should set
    /// one here.
    #[instrument(skip(self))]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        debug!(previous_timeout = ?self.timeout, new_timeout = ?timeout, "Setting timeout");
        self.timeout = Some(timeout);
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(
                    error = %e,
                    "Failed to build reqwest client with timeout, using default"
                );
                reqwest::Client::new()
            });
        self
    }

    async fn post_chat(
        &self,
        handle: &ModelHandle,
        messages: &[ChatMessage],
        response_format: Option<ResponseFormat>,
    ) -> Result<String> {
        let provider = handle.provider;
        let api_key = std::env::var(provider.api_key_env()).map_err(|_| {
            SurecallError::ModelUnavailable(format!(
                "{} is not set for provider {}",
                provider.api_key_env(),
                provider
            ))
        })?;

        let request = ChatCompletionRequest {
            model: handle.model_name.clone(),
            messages: messages
                .iter()
                .map(|msg| ApiMessage {
                    role: msg.role.as_str().to_string(),
                    content: msg.content.clone(),
                })
                .collect(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format,
        };

        let url = format!("{}/chat/completions", provider.base_url());
        debug!(
            url = %url,
            model = %handle.model_name,
            history_len = messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| handle_http_error(e, provider.as_str()))?;

        let response = check_response_status(response, provider.as_str()).await?;

        debug!("Successfully received response from {}", provider);
        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse JSON response from {}", provider);
            SurecallError::TransientCallFailure(format!(
                "{} returned an unparseable response: {}",
                provider, e
            ))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                error!("No text content in {} response", provider);
                SurecallError::TransientCallFailure(format!(
                    "{} response contained no text content",
                    provider
                ))
            })
    }
}

/// Convert a reqwest error, classifying timeouts as transient call failures.
fn handle_http_error(e: reqwest::Error, provider_name: &str) -> SurecallError {
    error!(error = %e, "HTTP request to {} failed", provider_name);
    if e.is_timeout() {
        SurecallError::TransientCallFailure(format!("{} request timed out", provider_name))
    } else {
        SurecallError::HttpError(e)
    }
}

/// Check HTTP response status and extract the error body if unsuccessful.
async fn check_response_status(
    response: reqwest::Response,
    provider_name: &str,
) -> Result<reqwest::Response> {
    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await?;
        error!(
            status = %status,
            error = %error_text,
            "{} API returned error response", provider_name
        );
        return Err(SurecallError::TransientCallFailure(format!(
            "{} API error: {}",
            provider_name, error_text
        )));
    }
    Ok(response)
}

#[async_trait]
impl ModelInvoker for HttpInvoker {
    #[instrument(
        name = "http_invoke_structured",
        skip(self, messages, schema),
        fields(model = %handle.model_name, provider = %handle.provider, schema_name = %schema.name)
    )]
    async fn invoke_structured(
        &self,
        handle: &ModelHandle,
        messages: &[ChatMessage],
        schema: &SchemaDescriptor,
    ) -> Result<Value> {
        info!("Issuing structured-output call");
        let response_format = ResponseFormat {
            format_type: "json_schema".to_string(),
            json_schema: Some(JsonSchemaSpec {
                name: schema.name.clone(),
                schema: schema.to_json_schema(),
                strict: true,
            }),
        };

        let content = self.post_chat(handle, messages, Some(response_format)).await?;
        let value: Value = serde_json::from_str(&content)?;
        debug!("Structured response parsed");
        Ok(value)
    }

    #[instrument(
        name = "http_invoke_text",
        skip(self, messages),
        fields(model = %handle.model_name, provider = %handle.provider)
    )]
    async fn invoke_text(&self, handle: &ModelHandle, messages: &[ChatMessage]) -> Result<String> {
        info!("Issuing free-text call");
        self.post_chat(handle, messages, None).await
    }
}
