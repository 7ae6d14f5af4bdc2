//! Shared LLM service: OpenAI / Ollama clients for chat completions (with
//! per-token log-probabilities) and embeddings, provider health checks, and
//! environment-driven profile configs.

pub mod chat;
pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod service_profiles;
pub mod services;

pub use chat::{ChatCompletion, ChatMessage, ChatRole, TokenLogProb};
pub use error_handler::AiLlmError;
pub use service_profiles::LlmServiceProfiles;
