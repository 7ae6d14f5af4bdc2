//! Runtime configuration for the vector index backends.

use std::str::FromStr;

use crate::errors::IndexError;

pub const DEFAULT_INDEX_NAME: &str = "cra-index";
pub const DEFAULT_NAMESPACE: &str = "__default__";
pub const DEFAULT_PINECONE_CONTROL_URL: &str = "https://api.pinecone.io";
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

/// Which backend serves nearest-neighbor queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexProvider {
    Pinecone,
    Qdrant,
}

impl FromStr for IndexProvider {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pinecone" => Ok(IndexProvider::Pinecone),
            "qdrant" => Ok(IndexProvider::Qdrant),
            other => Err(IndexError::Config(format!(
                "unsupported VECTOR_INDEX_PROVIDER: {other}"
            ))),
        }
    }
}

/// Pinecone connectivity.
#[derive(Clone, Debug)]
pub struct PineconeConfig {
    /// `Api-Key` header value.
    pub api_key: String,
    /// Control plane base URL (used to resolve the index host).
    pub control_url: String,
    /// Data-plane host; resolved from the control plane when `None`.
    pub index_host: Option<String>,
}

/// Qdrant connectivity.
#[derive(Clone, Debug)]
pub struct QdrantConfig {
    /// gRPC URL, e.g. `http://localhost:6334`.
    pub url: String,
    /// Optional API key for Qdrant Cloud.
    pub api_key: Option<String>,
}

/// Configuration for index queries.
#[derive(Clone, Debug)]
pub struct IndexConfig {
    pub provider: IndexProvider,
    /// Pinecone index name or Qdrant collection.
    pub index_name: String,
    /// Pinecone namespace (ignored by Qdrant).
    pub namespace: String,
    /// HTTP client timeout in seconds.
    pub timeout_secs: u64,
    pub pinecone: Option<PineconeConfig>,
    pub qdrant: Option<QdrantConfig>,
}

impl IndexConfig {
    /// Reads configuration from environment variables.
    ///
    /// Environment variables used:
    /// - `VECTOR_INDEX_PROVIDER` (`pinecone` | `qdrant`; default: `pinecone`)
    /// - `VECTOR_INDEX_NAME` (default: `cra-index`)
    /// - `VECTOR_INDEX_NAMESPACE` (default: `__default__`)
    /// - `PINECONE_API_KEY` (required for pinecone)
    /// - `PINECONE_INDEX_HOST` (optional; skips host resolution)
    /// - `PINECONE_CONTROL_URL` (default: `https://api.pinecone.io`)
    /// - `QDRANT_URL` (default: `http://localhost:6334`)
    /// - `QDRANT_API_KEY` (optional)
    pub fn from_env() -> Result<Self, IndexError> {
        Self::from_lookup(&|k| std::env::var(k).ok().filter(|v| !v.trim().is_empty()))
    }

    pub(crate) fn from_lookup(get: &dyn Fn(&str) -> Option<String>) -> Result<Self, IndexError> {
        let provider = match get("VECTOR_INDEX_PROVIDER") {
            Some(p) => p.parse()?,
            None => IndexProvider::Pinecone,
        };

        let (pinecone, qdrant) = match provider {
            IndexProvider::Pinecone => {
                let api_key = get("PINECONE_API_KEY").ok_or_else(|| {
                    IndexError::Config("missing env variable: PINECONE_API_KEY".into())
                })?;
                let cfg = PineconeConfig {
                    api_key,
                    control_url: get("PINECONE_CONTROL_URL")
                        .unwrap_or_else(|| DEFAULT_PINECONE_CONTROL_URL.to_string()),
                    index_host: get("PINECONE_INDEX_HOST"),
                };
                (Some(cfg), None)
            }
            IndexProvider::Qdrant => {
                let cfg = QdrantConfig {
                    url: get("QDRANT_URL").unwrap_or_else(|| DEFAULT_QDRANT_URL.to_string()),
                    api_key: get("QDRANT_API_KEY"),
                };
                (None, Some(cfg))
            }
        };

        let cfg = Self {
            provider,
            index_name: get("VECTOR_INDEX_NAME").unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string()),
            namespace: get("VECTOR_INDEX_NAMESPACE")
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            timeout_secs: 30,
            pinecone,
            qdrant,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.index_name.trim().is_empty() {
            return Err(IndexError::Config("index name is empty".into()));
        }
        match self.provider {
            IndexProvider::Pinecone if self.pinecone.is_none() => Err(IndexError::Config(
                "pinecone provider selected without pinecone settings".into(),
            )),
            IndexProvider::Qdrant if self.qdrant.is_none() => Err(IndexError::Config(
                "qdrant provider selected without qdrant settings".into(),
            )),
            _ => Ok(()),
        }
    }
}
