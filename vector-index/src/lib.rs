//! Read-only vector index access: top-K nearest-neighbor passages for a query
//! embedding, served by Pinecone (REST) or Qdrant (gRPC).

mod config;
mod errors;
mod pinecone;
mod qdrant_facade;
mod record;

pub use config::{IndexConfig, IndexProvider, PineconeConfig, QdrantConfig};
pub use errors::IndexError;
pub use record::RetrievedPassage;

use tracing::trace;

enum Backend {
    Pinecone(pinecone::PineconeClient),
    Qdrant(qdrant_facade::QdrantFacade),
}

/// High-level facade over the configured backend.
///
/// This is the single entry point recommended for application code.
pub struct VectorIndexClient {
    cfg: IndexConfig,
    backend: Backend,
}

impl VectorIndexClient {
    /// Connects to the configured backend.
    ///
    /// For Pinecone without an explicit host this performs one control-plane call.
    ///
    /// # Errors
    /// Returns `IndexError::Config` for invalid settings, or transport errors
    /// from host resolution.
    pub async fn connect(cfg: IndexConfig) -> Result<Self, IndexError> {
        cfg.validate()?;
        trace!("VectorIndexClient::connect provider={:?}", cfg.provider);

        let backend = match (cfg.provider, &cfg.pinecone, &cfg.qdrant) {
            (IndexProvider::Pinecone, Some(pc), _) => Backend::Pinecone(
                pinecone::PineconeClient::connect(pc, &cfg.index_name, cfg.timeout_secs).await?,
            ),
            (IndexProvider::Qdrant, _, Some(qc)) => {
                Backend::Qdrant(qdrant_facade::QdrantFacade::new(qc, &cfg.index_name)?)
            }
            _ => {
                return Err(IndexError::Config(
                    "provider settings are missing".into(),
                ));
            }
        };

        Ok(Self { cfg, backend })
    }

    /// Returns up to `top_k` passages most similar to `vector`, best first.
    ///
    /// # Errors
    /// Transport/HTTP failures, or a malformed answer (see [`IndexError::is_malformed`]).
    pub async fn query(
        &self,
        vector: &[f32],
        top_k: u64,
    ) -> Result<Vec<RetrievedPassage>, IndexError> {
        trace!("VectorIndexClient::query top_k={top_k}");
        match &self.backend {
            Backend::Pinecone(c) => c.query(vector, top_k, &self.cfg.namespace).await,
            Backend::Qdrant(q) => q.search(vector.to_vec(), top_k).await,
        }
    }

    /// Reachability probe used by the upstream health endpoint.
    pub async fn ping(&self) -> Result<(), IndexError> {
        match &self.backend {
            Backend::Pinecone(c) => c.ping().await,
            Backend::Qdrant(q) => q.ping().await,
        }
    }

    /// Human-readable description of the backend (provider and endpoint).
    pub fn describe(&self) -> (IndexProvider, String) {
        let endpoint = match &self.backend {
            Backend::Pinecone(c) => c.host().to_string(),
            Backend::Qdrant(_) => self
                .cfg
                .qdrant
                .as_ref()
                .map(|q| q.url.clone())
                .unwrap_or_default(),
        };
        (self.cfg.provider, endpoint)
    }

    pub fn config(&self) -> &IndexConfig {
        &self.cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pinecone_with_explicit_host_skips_control_plane() {
        let cfg = IndexConfig {
            provider: IndexProvider::Pinecone,
            index_name: "cra-index".into(),
            namespace: "__default__".into(),
            timeout_secs: 5,
            pinecone: Some(PineconeConfig {
                api_key: "pk".into(),
                control_url: "http://127.0.0.1:9".into(),
                index_host: Some("cra-index-xyz.svc.pinecone.io".into()),
            }),
            qdrant: None,
        };
        let client = VectorIndexClient::connect(cfg).await.unwrap();
        let (provider, endpoint) = client.describe();
        assert_eq!(provider, IndexProvider::Pinecone);
        assert_eq!(endpoint, "https://cra-index-xyz.svc.pinecone.io");
    }

    #[tokio::test]
    async fn missing_backend_settings_fail_fast() {
        let cfg = IndexConfig {
            provider: IndexProvider::Qdrant,
            index_name: "cra-index".into(),
            namespace: "__default__".into(),
            timeout_secs: 5,
            pinecone: None,
            qdrant: None,
        };
        assert!(matches!(
            VectorIndexClient::connect(cfg).await,
            Err(IndexError::Config(_))
        ));
    }
}
