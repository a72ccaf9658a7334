//! Model Provider Abstraction
//!
//! One request/response interface over the hosted and local language-model APIs used
//! for file descriptions (OpenAI, Anthropic, Gemini, Ollama and other
//! OpenAI-compatible servers). Every failure is reported as an `EnrichmentError`.

use crate::error::{ApiError, EnrichmentError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

/// Provider kind as written in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    OpenAI,
    Anthropic,
    Gemini,
    Ollama,
    /// Any server speaking the OpenAI chat-completions dialect.
    Custom,
}

impl ProviderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::OpenAI => "openai",
            ProviderType::Anthropic => "anthropic",
            ProviderType::Gemini => "gemini",
            ProviderType::Ollama => "ollama",
            ProviderType::Custom => "custom",
        }
    }

    fn needs_api_key(&self) -> bool {
        matches!(
            self,
            ProviderType::OpenAI | ProviderType::Anthropic | ProviderType::Gemini
        )
    }

    /// Variable read when neither `api_key` nor `api_key_env` yields a key.
    fn fallback_key_env(&self) -> Option<&'static str> {
        match self {
            ProviderType::Gemini => Some("API_KEY"),
            _ => None,
        }
    }
}

/// Provider section of the enrichment configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderConfig {
    pub provider_type: ProviderType,
    pub model: String,
    /// Inline API key. Prefer `api_key_env`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable holding the API key
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Base URL override (required for `custom`)
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl ProviderConfig {
    /// API key from the config or, failing that, from `api_key_env` (Gemini also
    /// reads `API_KEY`).
    pub fn resolve_api_key(&self) -> Option<String> {
        let from_env = |var: &str| std::env::var(var).ok().filter(|k| !k.trim().is_empty());
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key_env.as_deref().and_then(from_env))
            .or_else(|| self.provider_type.fallback_key_env().and_then(from_env))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("provider model must not be empty".to_string());
        }
        if self.provider_type == ProviderType::Custom && self.endpoint.is_none() {
            return Err("custom provider requires an endpoint".to_string());
        }
        if let Some(endpoint) = &self.endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(format!("provider endpoint must be an http(s) URL: {}", endpoint));
            }
        }
        Ok(())
    }

    /// Resolve into a concrete provider, reading the API key where one is needed.
    pub fn to_model_provider(&self) -> Result<ModelProvider, EnrichmentError> {
        let api_key = self.resolve_api_key();
        if self.provider_type.needs_api_key() && api_key.is_none() {
            return Err(EnrichmentError::NotConfigured(format!(
                "no API key for {} provider",
                self.provider_type.as_str()
            )));
        }
        let model = self.model.clone();
        Ok(match self.provider_type {
            ProviderType::OpenAI => ModelProvider::OpenAI {
                model,
                api_key: api_key.unwrap_or_default(),
                base_url: self.endpoint.clone(),
            },
            ProviderType::Anthropic => ModelProvider::Anthropic {
                model,
                api_key: api_key.unwrap_or_default(),
                base_url: self.endpoint.clone(),
            },
            ProviderType::Gemini => ModelProvider::Gemini {
                model,
                api_key: api_key.unwrap_or_default(),
                base_url: self.endpoint.clone(),
            },
            ProviderType::Ollama => ModelProvider::Ollama {
                model,
                base_url: self.endpoint.clone(),
            },
            ProviderType::Custom => ModelProvider::LocalCustom {
                model,
                endpoint: self.endpoint.clone().unwrap_or_default(),
                api_key,
            },
        })
    }
}

/// Model provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModelProvider {
    OpenAI {
        model: String,
        api_key: String,
        base_url: Option<String>,
    },
    Anthropic {
        model: String,
        api_key: String,
        base_url: Option<String>,
    },
    Gemini {
        model: String,
        api_key: String,
        base_url: Option<String>,
    },
    Ollama {
        model: String,
        base_url: Option<String>, // Default: http://localhost:11434
    },
    LocalCustom {
        model: String,
        endpoint: String, // e.g. http://localhost:8080/v1
        api_key: Option<String>,
    },
}

/// Chat message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    System,
    User,
}

impl MessageRole {
    fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
        }
    }
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Completion options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionOptions {
    pub temperature: Option<f32>, // 0.0-2.0
    pub max_tokens: Option<u32>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: Some(1.0),
            max_tokens: None,
        }
    }
}

/// Completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub finish_reason: Option<String>,
}

/// Model provider client trait
#[async_trait]
pub trait ModelProviderClient: Send + Sync {
    /// Generate a completion from a list of messages
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, EnrichmentError>;

    fn provider_name(&self) -> &str;

    fn model_name(&self) -> &str;
}

// OpenAI-compatible request/response bodies
#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    model: String,
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

fn map_http_error(error: reqwest::Error) -> EnrichmentError {
    if let Some(status) = error.status() {
        map_status(status.as_u16(), &error.to_string())
    } else if error.is_timeout() {
        EnrichmentError::RequestFailed(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        EnrichmentError::RequestFailed(format!("Connection error: {}", error))
    } else {
        EnrichmentError::RequestFailed(format!("HTTP error: {}", error))
    }
}

fn map_status(status: u16, body: &str) -> EnrichmentError {
    match status {
        401 | 403 => EnrichmentError::AuthFailed(format!("Authentication failed: {}", body)),
        429 => EnrichmentError::RateLimited(format!("Rate limit exceeded: {}", body)),
        _ => EnrichmentError::RequestFailed(format!(
            "Request failed with status {}: {}",
            status, body
        )),
    }
}

async fn error_from_response(response: reqwest::Response) -> EnrichmentError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    map_status(status, &body)
}

const PROVIDER_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const PROVIDER_HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

fn build_provider_http_client() -> Result<Client, ApiError> {
    Client::builder()
        .connect_timeout(PROVIDER_HTTP_CONNECT_TIMEOUT)
        .timeout(PROVIDER_HTTP_REQUEST_TIMEOUT)
        .build()
        .map_err(|e| ApiError::ProviderError(format!("Failed to create HTTP client: {}", e)))
}

/// Client for the OpenAI chat-completions dialect (OpenAI, Ollama, custom servers)
pub struct OpenAICompatibleClient {
    client: Client,
    provider: &'static str,
    model: String,
    api_key: Option<String>,
    completions_url: String,
}

impl OpenAICompatibleClient {
    pub fn openai(model: String, api_key: String, base_url: Option<String>) -> Result<Self, ApiError> {
        let base_url = base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string());
        Self::build("openai", model, Some(api_key), base_url)
    }

    pub fn ollama(model: String, base_url: Option<String>) -> Result<Self, ApiError> {
        let base_url = base_url.unwrap_or_else(|| "http://localhost:11434".to_string());
        let base_url = format!("{}/v1", base_url.trim_end_matches('/'));
        Self::build("ollama", model, None, base_url)
    }

    pub fn custom(model: String, endpoint: String, api_key: Option<String>) -> Result<Self, ApiError> {
        Self::build("custom", model, api_key, endpoint)
    }

    fn build(
        provider: &'static str,
        model: String,
        api_key: Option<String>,
        base_url: String,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            client: build_provider_http_client()?,
            provider,
            model,
            api_key,
            completions_url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl ModelProviderClient for OpenAICompatibleClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, EnrichmentError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: messages
                .into_iter()
                .map(|msg| OpenAIMessage {
                    role: msg.role.as_str().to_string(),
                    content: msg.content,
                })
                .collect(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            stream: false,
        };

        let mut builder = self
            .client
            .post(&self.completions_url)
            .header("Content-Type", "application/json");
        if let Some(api_key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = builder.json(&request).send().await.map_err(map_http_error)?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| EnrichmentError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| EnrichmentError::InvalidResponse("No choices in response".to_string()))?;

        Ok(CompletionResponse {
            content: choice.message.content,
            model: completion.model,
            finish_reason: choice.finish_reason,
        })
    }

    fn provider_name(&self) -> &str {
        self.provider
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Anthropic messages API client
pub struct AnthropicClient {
    client: Client,
    model: String,
    api_key: String,
    messages_url: String,
}

impl AnthropicClient {
    pub fn new(model: String, api_key: String, base_url: Option<String>) -> Result<Self, ApiError> {
        let base_url = base_url.unwrap_or_else(|| "https://api.anthropic.com/v1".to_string());
        Ok(Self {
            client: build_provider_http_client()?,
            model,
            api_key,
            messages_url: format!("{}/messages", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl ModelProviderClient for AnthropicClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, EnrichmentError> {
        let system = messages
            .iter()
            .find(|m| m.role == MessageRole::System)
            .map(|m| m.content.clone());
        let turns: Vec<_> = messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(|m| json!({"role": m.role.as_str(), "content": m.content}))
            .collect();

        let mut body = json!({
            "model": self.model,
            "max_tokens": options.max_tokens.unwrap_or(256),
            "messages": turns,
        });
        if let Some(system) = system {
            body["system"] = json!(system);
        }
        if let Some(temp) = options.temperature {
            body["temperature"] = json!(temp);
        }

        let response = self
            .client
            .post(&self.messages_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_http_error)?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        #[derive(Deserialize)]
        struct AnthropicResponse {
            content: Vec<AnthropicContent>,
            model: String,
            stop_reason: Option<String>,
        }

        #[derive(Deserialize)]
        struct AnthropicContent {
            #[serde(default)]
            text: String,
        }

        let completion: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| EnrichmentError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        Ok(CompletionResponse {
            content: completion
                .content
                .into_iter()
                .map(|c| c.text)
                .collect::<Vec<_>>()
                .join(""),
            model: completion.model,
            finish_reason: completion.stop_reason,
        })
    }

    fn provider_name(&self) -> &str {
        "anthropic"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Gemini `generateContent` client
pub struct GeminiClient {
    client: Client,
    model: String,
    api_key: String,
    generate_url: String,
}

impl GeminiClient {
    pub fn new(model: String, api_key: String, base_url: Option<String>) -> Result<Self, ApiError> {
        let base_url = base_url
            .unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".to_string());
        Ok(Self {
            client: build_provider_http_client()?,
            generate_url: format!(
                "{}/models/{}:generateContent",
                base_url.trim_end_matches('/'),
                model
            ),
            model,
            api_key,
        })
    }
}

/// System messages become `systemInstruction`; the rest are user turns.
fn gemini_request_body(messages: &[ChatMessage], options: &CompletionOptions) -> serde_json::Value {
    let system: Vec<_> = messages
        .iter()
        .filter(|m| m.role == MessageRole::System)
        .map(|m| json!({"text": m.content}))
        .collect();
    let contents: Vec<_> = messages
        .iter()
        .filter(|m| m.role != MessageRole::System)
        .map(|m| json!({"role": "user", "parts": [{"text": m.content}]}))
        .collect();

    let mut body = json!({ "contents": contents });
    if !system.is_empty() {
        body["systemInstruction"] = json!({ "parts": system });
    }
    let mut generation = serde_json::Map::new();
    if let Some(temp) = options.temperature {
        generation.insert("temperature".to_string(), json!(temp));
    }
    if let Some(max) = options.max_tokens {
        generation.insert("maxOutputTokens".to_string(), json!(max));
    }
    if !generation.is_empty() {
        body["generationConfig"] = serde_json::Value::Object(generation);
    }
    body
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

fn gemini_completion(
    response: GeminiResponse,
    model: &str,
) -> Result<CompletionResponse, EnrichmentError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| EnrichmentError::InvalidResponse("No candidates in response".to_string()))?;
    let content = candidate
        .content
        .map(|c| c.parts.into_iter().map(|p| p.text).collect::<Vec<_>>().join(""))
        .unwrap_or_default();
    Ok(CompletionResponse {
        content,
        model: model.to_string(),
        finish_reason: candidate.finish_reason,
    })
}

#[async_trait]
impl ModelProviderClient for GeminiClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, EnrichmentError> {
        let body = gemini_request_body(&messages, &options);
        let response = self
            .client
            .post(&self.generate_url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_http_error)?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| EnrichmentError::InvalidResponse(format!("Failed to parse response: {}", e)))?;
        gemini_completion(parsed, &self.model)
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Provider factory for creating provider clients
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_client(
        provider: &ModelProvider,
    ) -> Result<Box<dyn ModelProviderClient>, ApiError> {
        match provider {
            ModelProvider::OpenAI {
                model,
                api_key,
                base_url,
            } => Ok(Box::new(OpenAICompatibleClient::openai(
                model.clone(),
                api_key.clone(),
                base_url.clone(),
            )?)),
            ModelProvider::Anthropic {
                model,
                api_key,
                base_url,
            } => Ok(Box::new(AnthropicClient::new(
                model.clone(),
                api_key.clone(),
                base_url.clone(),
            )?)),
            ModelProvider::Gemini {
                model,
                api_key,
                base_url,
            } => Ok(Box::new(GeminiClient::new(
                model.clone(),
                api_key.clone(),
                base_url.clone(),
            )?)),
            ModelProvider::Ollama { model, base_url } => Ok(Box::new(
                OpenAICompatibleClient::ollama(model.clone(), base_url.clone())?,
            )),
            ModelProvider::LocalCustom {
                model,
                endpoint,
                api_key,
            } => Ok(Box::new(OpenAICompatibleClient::custom(
                model.clone(),
                endpoint.clone(),
                api_key.clone(),
            )?)),
        }
    }
}

// Mock provider for testing
#[cfg(test)]
pub struct MockProvider {
    responses: Vec<Result<String, EnrichmentError>>,
    current: parking_lot::Mutex<usize>,
    seen: parking_lot::Mutex<Vec<Vec<ChatMessage>>>,
}

#[cfg(test)]
impl MockProvider {
    pub fn new(responses: Vec<Result<String, EnrichmentError>>) -> Self {
        Self {
            responses,
            current: parking_lot::Mutex::new(0),
            seen: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Message lists received so far
    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.seen.lock().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl ModelProviderClient for MockProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        _options: CompletionOptions,
    ) -> Result<CompletionResponse, EnrichmentError> {
        self.seen.lock().push(messages);
        let mut idx = self.current.lock();
        let response = self
            .responses
            .get(*idx)
            .cloned()
            .unwrap_or_else(|| Ok("Mock response".to_string()));
        *idx += 1;

        response.map(|content| CompletionResponse {
            content,
            model: "mock-model".to_string(),
            finish_reason: Some("stop".to_string()),
        })
    }

    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}
