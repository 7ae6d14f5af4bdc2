//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! Only the read path is exposed: a similarity search whose hits are turned
//! into [`RetrievedPassage`]s from the `text` payload field.

use std::collections::HashMap;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{SearchPointsBuilder, Value as QValue};
use tracing::{debug, info};

use crate::config::QdrantConfig;
use crate::errors::IndexError;
use crate::record::RetrievedPassage;

/// A facade over the Qdrant client bound to one collection.
pub struct QdrantFacade {
    client: Qdrant,
    collection: String,
}

impl QdrantFacade {
    /// Creates a new facade, with optional API key authentication.
    pub fn new(cfg: &QdrantConfig, collection: &str) -> Result<Self, IndexError> {
        let mut builder = Qdrant::from_url(&cfg.url);
        if let Some(key) = &cfg.api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| IndexError::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            collection: collection.to_string(),
        })
    }

    /// Performs a similarity search and returns passages in score order.
    pub async fn search(
        &self,
        vector: Vec<f32>,
        top_k: u64,
    ) -> Result<Vec<RetrievedPassage>, IndexError> {
        info!(
            "Searching in '{}' with top_k={}",
            self.collection, top_k
        );

        let builder = SearchPointsBuilder::new(&self.collection, vector, top_k).with_payload(true);

        let res = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| IndexError::Qdrant(e.to_string()))?;

        let mut out = Vec::with_capacity(res.result.len());
        for r in res.result.into_iter() {
            let id = format!("{:?}", r.id);
            let payload = qpayload_to_json(r.payload);
            out.push(RetrievedPassage::from_metadata(&id, r.score, Some(&payload))?);
        }

        debug!("Search completed: {} hits returned", out.len());
        Ok(out)
    }

    /// Lightweight reachability probe.
    pub async fn ping(&self) -> Result<(), IndexError> {
        self.client
            .health_check()
            .await
            .map(|_| ())
            .map_err(|e| IndexError::Qdrant(e.to_string()))
    }
}

/// Converts a Qdrant payload into JSON.
///
/// Nested objects/arrays are mapped to `Null`.
fn qpayload_to_json(mut p: HashMap<String, QValue>) -> serde_json::Value {
    use qdrant_client::qdrant::value::Kind as K;
    let mut m = serde_json::Map::new();
    for (k, v) in p.drain() {
        let j = match v.kind {
            Some(K::StringValue(s)) => serde_json::Value::String(s),
            Some(K::IntegerValue(i)) => serde_json::Value::Number(i.into()),
            Some(K::DoubleValue(f)) => serde_json::json!(f),
            Some(K::BoolValue(b)) => serde_json::Value::Bool(b),
            _ => serde_json::Value::Null,
        };
        m.insert(k, j);
    }
    serde_json::Value::Object(m)
}
