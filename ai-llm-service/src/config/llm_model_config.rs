use crate::config::llm_provider::LlmProvider;

/// Configuration for a single model profile (chat or embedding).
///
/// # Fields
///
/// - `provider`: Which backend to use (Ollama, OpenAI).
/// - `model`: The model identifier (e.g., `"gpt-4o-mini"`, `"all-MiniLM-L6-v2"`).
/// - `endpoint`: Base URL of the inference server, without the API path.
/// - `api_key`: Optional bearer token.
/// - `max_tokens`: Maximum number of tokens to generate (chat only).
/// - `temperature`: Sampling temperature (chat only).
/// - `top_p`: Nucleus sampling cutoff (chat only).
/// - `timeout_secs`: HTTP client timeout in seconds.
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::OpenAI,
///     model: "gpt-4o-mini".to_string(),
///     endpoint: "https://api.openai.com".to_string(),
///     api_key: Some("sk-...".to_string()),
///     max_tokens: None,
///     temperature: Some(0.0),
///     top_p: None,
///     timeout_secs: Some(60),
/// };
/// assert_eq!(cfg.model, "gpt-4o-mini");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    /// The provider/backend.
    pub provider: LlmProvider,

    /// Model identifier string.
    pub model: String,

    /// Inference endpoint base URL.
    pub endpoint: String,

    /// Optional API key for authentication.
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}
