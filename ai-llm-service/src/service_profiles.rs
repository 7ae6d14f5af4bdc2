//! Shared LLM service with two active profiles: `chat` and `embedding`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once at startup, wrap in `Arc`, and pass clones to dependents.
//! - Provider clients are built eagerly, so configuration problems surface at
//!   startup instead of on the first request.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::chat::ChatMessage;
//! use ai_llm_service::config::default_config::{config_chat, config_embedding};
//! use ai_llm_service::service_profiles::LlmServiceProfiles;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svc = Arc::new(LlmServiceProfiles::new(config_chat()?, config_embedding()?, Some(10))?);
//!
//! let out = svc.chat(&[ChatMessage::user("Hello")], true).await?;
//! println!("{}", out.text);
//!
//! let emb = svc.embed("Ferris").await?;
//! println!("Embedding dim = {}", emb.len());
//! # Ok(()) }
//! ```

use crate::{
    chat::{ChatCompletion, ChatMessage},
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::AiLlmError,
    health_service::{HealthService, HealthStatus},
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
};

/// A ready-to-use client for one profile.
#[derive(Debug)]
enum ProviderClient {
    Ollama(OllamaService),
    OpenAI(OpenAiService),
}

impl ProviderClient {
    fn new(cfg: &LlmModelConfig) -> Result<Self, AiLlmError> {
        Ok(match cfg.provider {
            LlmProvider::Ollama => ProviderClient::Ollama(OllamaService::new(cfg.clone())?),
            LlmProvider::OpenAI => ProviderClient::OpenAI(OpenAiService::new(cfg.clone())?),
        })
    }
}

/// Shared service that manages the **chat** and **embedding** profiles.
pub struct LlmServiceProfiles {
    chat_cfg: LlmModelConfig,
    embedding_cfg: LlmModelConfig,

    chat: ProviderClient,
    embedding: ProviderClient,

    health: HealthService,
}

impl LlmServiceProfiles {
    /// Creates the service and both provider clients.
    ///
    /// - `chat`: profile used to answer questions.
    /// - `embedding`: profile used to embed queries.
    /// - `health_timeout_secs`: optional timeout for the health checker.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if any client cannot be constructed.
    pub fn new(
        chat: LlmModelConfig,
        embedding: LlmModelConfig,
        health_timeout_secs: Option<u64>,
    ) -> Result<Self, AiLlmError> {
        Ok(Self {
            chat: ProviderClient::new(&chat)?,
            embedding: ProviderClient::new(&embedding)?,
            chat_cfg: chat,
            embedding_cfg: embedding,
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// Runs a chat completion on the **chat** profile.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if the request or decoding fails.
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        logprobs: bool,
    ) -> Result<ChatCompletion, AiLlmError> {
        match &self.chat {
            ProviderClient::Ollama(cli) => cli.chat(messages, logprobs).await,
            ProviderClient::OpenAI(cli) => cli.chat(messages, logprobs).await,
        }
    }

    /// Computes an embedding on the **embedding** profile.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if embedding fails.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        match &self.embedding {
            ProviderClient::Ollama(cli) => cli.embeddings(input).await,
            ProviderClient::OpenAI(cli) => cli.embeddings(input).await,
        }
    }

    /// Returns a health snapshot for all distinct profiles.
    ///
    /// If both profiles point at the same endpoint and model, it is checked once.
    pub async fn health_all(&self) -> Vec<HealthStatus> {
        let mut list = Vec::with_capacity(2);
        list.push(self.chat_cfg.clone());
        if self.embedding_cfg != self.chat_cfg {
            list.push(self.embedding_cfg.clone());
        }
        self.health.check_many(&list).await
    }

    /// Returns references to the current profiles `(chat, embedding)`.
    pub fn profiles(&self) -> (&LlmModelConfig, &LlmModelConfig) {
        (&self.chat_cfg, &self.embedding_cfg)
    }
}
