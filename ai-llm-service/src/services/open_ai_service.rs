//! OpenAI (ChatGPT) service for chat completions and embeddings.
//!
//! Minimal, non-streaming client around the OpenAI REST API. Endpoints are
//! derived from `LlmModelConfig::endpoint`:
//! - POST {endpoint}/v1/chat/completions — chat completion, optionally with `logprobs`
//! - POST {endpoint}/v1/embeddings       — embeddings retrieval
//!
//! The embeddings half also works against OpenAI-compatible servers (for example a
//! text-embeddings server hosting `all-MiniLM-L6-v2`); the API key is optional there.
//!
//! Constructor validation:
//! - `cfg.provider` must be `LlmProvider::OpenAI`
//! - `cfg.endpoint` must start with http:// or https://

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{
    chat::{ChatCompletion, ChatMessage, TokenLogProb},
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, HttpError, Provider, ProviderError, ProviderErrorKind, make_snippet,
        validate_http_endpoint,
    },
};

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Thin client for the OpenAI API.
///
/// Keeps a preconfigured `reqwest::Client` (timeout and default headers),
/// so one instance is shared by all requests.
#[derive(Debug)]
pub struct OpenAiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_chat: String,
    url_embeddings: String,
}

impl OpenAiService {
    /// Creates a new [`OpenAiService`] from the given config.
    ///
    /// # Errors
    /// - `InvalidProvider` if `cfg.provider` is not OpenAI
    /// - `InvalidEndpoint` if `cfg.endpoint` is invalid
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::OpenAI {
            return Err(
                ProviderError::new(Provider::OpenAI, ProviderErrorKind::InvalidProvider).into(),
            );
        }

        let endpoint = cfg.endpoint.trim();
        if validate_http_endpoint("endpoint", endpoint).is_err() {
            let kind = ProviderErrorKind::InvalidEndpoint(cfg.endpoint.clone());
            return Err(ProviderError::new(Provider::OpenAI, kind).into());
        }
        let timeout = Duration::from_secs(cfg.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));

        let mut headers = header::HeaderMap::new();
        if let Some(api_key) = &cfg.api_key {
            let mut value = header::HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(
                |_| ConfigError::InvalidFormat {
                    var: "OPENAI_API_KEY",
                    reason: "not a valid header value",
                },
            )?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let base = endpoint.trim_end_matches('/').to_string();
        let url_chat = format!("{base}/v1/chat/completions");
        let url_embeddings = format!("{base}/v1/embeddings");

        info!(model = %cfg.model, %base, timeout_secs = timeout.as_secs(), "OpenAI client ready");

        Ok(Self {
            client,
            cfg,
            url_chat,
            url_embeddings,
        })
    }

    /// Performs a **non-streaming** chat completion request (`/v1/chat/completions`).
    ///
    /// When `logprobs` is `true` the request asks for per-token
    /// log-probabilities; they are returned as `Some(..)` only if the
    /// response actually carries them.
    ///
    /// # Errors
    /// - `HttpStatus` for non-2xx responses
    /// - [`AiLlmError::HttpTransport`] for client/network failures
    /// - `Decode` if the JSON cannot be parsed
    /// - `EmptyChoices` if no choice carries message content
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        logprobs: bool,
    ) -> Result<ChatCompletion, AiLlmError> {
        let started = Instant::now();
        let body = ChatCompletionRequest::from_cfg(&self.cfg, messages, logprobs);
        debug!(messages = messages.len(), logprobs, "POST {}", self.url_chat);

        let out: ChatCompletionResponse = self
            .post_json(&self.url_chat, &body, "choices[0].message.content")
            .await?;
        let completion = out.into_completion()?;

        info!(
            model = %self.cfg.model,
            latency_ms = started.elapsed().as_millis(),
            tokens_with_logprobs = ?completion.logprobs.as_ref().map(Vec::len),
            "chat completion completed"
        );
        Ok(completion)
    }

    /// Retrieves a single embeddings vector via `/v1/embeddings`.
    ///
    /// # Errors
    /// - `HttpStatus` for non-2xx responses
    /// - [`AiLlmError::HttpTransport`] for client/network failures
    /// - `Decode` if the JSON cannot be parsed or carries no vector
    pub async fn embeddings(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        let started = Instant::now();
        let body = EmbeddingsRequest {
            model: &self.cfg.model,
            input,
        };
        debug!(input_len = input.len(), "POST {}", self.url_embeddings);

        let out: EmbeddingsResponse = self
            .post_json(&self.url_embeddings, &body, "data[0].embedding")
            .await?;
        let vector = out.into_vector()?;

        info!(
            model = %self.cfg.model,
            dim = vector.len(),
            latency_ms = started.elapsed().as_millis(),
            "embeddings completed"
        );
        Ok(vector)
    }

    /// POSTs `body` and decodes a 2xx JSON answer; `expected` names the field
    /// callers rely on and ends up in decode errors.
    async fn post_json<B, R>(&self, url: &str, body: &B, expected: &str) -> Result<R, AiLlmError>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let resp = self.client.post(url).json(body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let snippet = make_snippet(&resp.text().await.unwrap_or_default());
            error!(%status, %url, %snippet, model = %self.cfg.model, "OpenAI request failed");
            let http = HttpError {
                status,
                url: url.to_string(),
                snippet,
            };
            return Err(ProviderError::new(Provider::OpenAI, ProviderErrorKind::HttpStatus(http)).into());
        }

        resp.json::<R>().await.map_err(|e| {
            error!(error = %e, %url, model = %self.cfg.model, "failed to decode OpenAI response");
            AiLlmError::from(ProviderError::new(
                Provider::OpenAI,
                ProviderErrorKind::Decode(format!("{e}; expected `{expected}`")),
            ))
        })
    }
}

/* ===========================================================================
HTTP payloads
======================================================================== */

/// Request body for `/v1/chat/completions` (non-streaming).
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    logprobs: bool,
}

impl<'a> ChatCompletionRequest<'a> {
    fn from_cfg(cfg: &'a LlmModelConfig, messages: &'a [ChatMessage], logprobs: bool) -> Self {
        Self {
            model: &cfg.model,
            messages,
            temperature: cfg.temperature,
            top_p: cfg.top_p,
            max_tokens: cfg.max_tokens,
            logprobs,
        }
    }
}

/// Minimal response for `/v1/chat/completions`.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
    #[serde(default)]
    logprobs: Option<ChoiceLogprobs>,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceLogprobs {
    #[serde(default)]
    content: Option<Vec<TokenLogProb>>,
}

impl ChatCompletionResponse {
    /// Picks the first choice with message content.
    fn into_completion(self) -> Result<ChatCompletion, ProviderError> {
        self.choices
            .into_iter()
            .find_map(|c| {
                let text = c.message.content?;
                let logprobs = c.logprobs.and_then(|l| l.content);
                Some(ChatCompletion { text, logprobs })
            })
            .ok_or_else(|| ProviderError::new(Provider::OpenAI, ProviderErrorKind::EmptyChoices))
    }
}

/// Request body for `/v1/embeddings`.
#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
}

/// Response body for `/v1/embeddings`.
#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

impl EmbeddingsResponse {
    fn into_vector(self) -> Result<Vec<f32>, ProviderError> {
        match self.data.into_iter().next() {
            Some(item) if !item.embedding.is_empty() => Ok(item.embedding),
            _ => Err(ProviderError::new(
                Provider::OpenAI,
                ProviderErrorKind::Decode("empty `data` in embeddings response".into()),
            )),
        }
    }
}
