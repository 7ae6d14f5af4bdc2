//! Default model configs loaded from environment variables.
//!
//! Two roles are supported:
//!
//! - **Chat**      → answers questions; requested with token log-probabilities
//! - **Embedding** → turns query text into a vector for nearest-neighbor search
//!
//! # Environment variables
//!
//! Chat:
//! - `LLM_KIND`         = `openai` (default) or `ollama`
//! - `LLM_MODEL`        = model name (default `gpt-4o-mini`)
//! - `LLM_TEMPERATURE`  = temperature (default `0`)
//! - `LLM_MAX_TOKENS`   = optional max tokens (u32)
//! - `OPENAI_API_KEY`   = required when `LLM_KIND=openai`
//! - `OPENAI_URL`       = OpenAI base URL (default `https://api.openai.com`)
//! - `OLLAMA_URL`       = Ollama base URL (default `http://localhost:11434`)
//!
//! Embedding:
//! - `EMBEDDING_KIND`    = `openai` (default, any OpenAI-compatible server) or `ollama`
//! - `EMBEDDING_MODEL`   = model name (default `all-MiniLM-L6-v2`)
//! - `EMBEDDING_URL`     = base URL for the OpenAI-compatible server (default `http://localhost:8080`)
//! - `EMBEDDING_API_KEY` = optional bearer token

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, Result, opt_env, validate_http_endpoint, validate_range_f32,
    },
};

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_EMBEDDING_URL: &str = "http://localhost:8080";

/// Builds the chat profile from the process environment.
///
/// # Defaults
/// - `temperature = Some(0.0)` (deterministic answers)
/// - `timeout_secs = Some(60)`
///
/// # Errors
/// - [`ConfigError::MissingVar`] if `OPENAI_API_KEY` is absent for the OpenAI provider
/// - [`ConfigError::InvalidNumber`] / [`ConfigError::OutOfRange`] for bad numeric values
pub fn config_chat() -> Result<LlmModelConfig> {
    config_chat_with(&opt_env)
}

/// Builds the embedding profile from the process environment.
///
/// # Defaults
/// - `temperature = Some(0.0)`
/// - `timeout_secs = Some(30)`
pub fn config_embedding() -> Result<LlmModelConfig> {
    config_embedding_with(&opt_env)
}

pub(crate) fn config_chat_with(get: &dyn Fn(&str) -> Option<String>) -> Result<LlmModelConfig> {
    let provider = match get("LLM_KIND") {
        Some(kind) => kind.parse::<LlmProvider>()?,
        None => LlmProvider::OpenAI,
    };

    let model = get("LLM_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());
    if model.trim().is_empty() {
        return Err(ConfigError::EmptyModel.into());
    }

    let temperature = parse_f32(get, "LLM_TEMPERATURE")?.unwrap_or(0.0);
    validate_range_f32("temperature", temperature, 0.0, 2.0)?;
    let max_tokens = parse_u32(get, "LLM_MAX_TOKENS")?;

    let (endpoint, api_key) = match provider {
        LlmProvider::OpenAI => {
            let endpoint = get("OPENAI_URL").unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string());
            validate_http_endpoint("OPENAI_URL", &endpoint)?;
            let key = get("OPENAI_API_KEY").ok_or(ConfigError::MissingVar("OPENAI_API_KEY"))?;
            (endpoint, Some(key))
        }
        LlmProvider::Ollama => {
            let endpoint = get("OLLAMA_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
            validate_http_endpoint("OLLAMA_URL", &endpoint)?;
            (endpoint, None)
        }
    };

    Ok(LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens,
        temperature: Some(temperature),
        top_p: None,
        timeout_secs: Some(60),
    })
}

pub(crate) fn config_embedding_with(
    get: &dyn Fn(&str) -> Option<String>,
) -> Result<LlmModelConfig> {
    let provider = match get("EMBEDDING_KIND") {
        Some(kind) => kind.parse::<LlmProvider>()?,
        None => LlmProvider::OpenAI,
    };

    let model = get("EMBEDDING_MODEL").unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string());
    if model.trim().is_empty() {
        return Err(ConfigError::EmptyModel.into());
    }

    let (endpoint, var) = match provider {
        LlmProvider::OpenAI => (
            get("EMBEDDING_URL").unwrap_or_else(|| DEFAULT_EMBEDDING_URL.to_string()),
            "EMBEDDING_URL",
        ),
        LlmProvider::Ollama => (
            get("OLLAMA_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            "OLLAMA_URL",
        ),
    };
    validate_http_endpoint(var, &endpoint)?;

    Ok(LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key: get("EMBEDDING_API_KEY"),
        max_tokens: None,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: Some(30),
    })
}

fn parse_u32(get: &dyn Fn(&str) -> Option<String>, var: &'static str) -> Result<Option<u32>> {
    get(var)
        .map(|v| {
            v.trim().parse::<u32>().map_err(|_| {
                AiLlmError::from(ConfigError::InvalidNumber {
                    var,
                    reason: "expected u32",
                })
            })
        })
        .transpose()
}

fn parse_f32(get: &dyn Fn(&str) -> Option<String>, var: &'static str) -> Result<Option<f32>> {
    get(var)
        .map(|v| {
            v.trim().parse::<f32>().map_err(|_| {
                AiLlmError::from(ConfigError::InvalidNumber {
                    var,
                    reason: "expected f32",
                })
            })
        })
        .transpose()
}
