//! Pinecone REST client: index host resolution and `query` on the data plane.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::PineconeConfig;
use crate::errors::IndexError;
use crate::record::RetrievedPassage;

const API_KEY_HEADER: &str = "api-key";
const API_VERSION_HEADER: &str = "x-pinecone-api-version";
const API_VERSION: &str = "2025-04";
const SNIPPET_MAX_CHARS: usize = 300;

/// Client bound to a single Pinecone index.
#[derive(Clone, Debug)]
pub struct PineconeClient {
    client: Client,
    /// Data-plane base URL, always with scheme and without trailing slash.
    host: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: u64,
    namespace: &'a str,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<Value>,
}

#[derive(Deserialize)]
struct DescribeIndexResponse {
    host: String,
}

impl PineconeClient {
    /// Builds the HTTP client and resolves the data-plane host.
    ///
    /// When `index_host` is not configured, the control plane is asked via
    /// `GET {control_url}/indexes/{index_name}`.
    pub async fn connect(
        cfg: &PineconeConfig,
        index_name: &str,
        timeout_secs: u64,
    ) -> Result<Self, IndexError> {
        let client = build_client(&cfg.api_key, timeout_secs)?;

        let host = match &cfg.index_host {
            Some(h) => normalize_host(h),
            None => {
                let url = format!(
                    "{}/indexes/{}",
                    cfg.control_url.trim_end_matches('/'),
                    index_name
                );
                debug!("pinecone: describing index at {url}");
                let resp = client.get(&url).send().await?;
                let desc: DescribeIndexResponse = read_json(resp, &url).await?;
                normalize_host(&desc.host)
            }
        };

        info!(index = index_name, host = %host, "pinecone: index host resolved");
        Ok(Self { client, host })
    }

    /// Resolved data-plane base URL.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Nearest-neighbor query returning up to `top_k` passages in index order.
    pub async fn query(
        &self,
        vector: &[f32],
        top_k: u64,
        namespace: &str,
    ) -> Result<Vec<RetrievedPassage>, IndexError> {
        let url = format!("{}/query", self.host);
        let body = QueryRequest {
            vector,
            top_k,
            namespace,
            include_metadata: true,
            include_values: false,
        };

        debug!(top_k, namespace, dims = vector.len(), "pinecone: query");
        let resp = self.client.post(&url).json(&body).send().await?;
        let parsed: QueryResponse = read_json(resp, &url).await?;
        passages_from(parsed)
    }

    /// Lightweight reachability probe (`GET {host}/describe_index_stats`).
    pub async fn ping(&self) -> Result<(), IndexError> {
        let url = format!("{}/describe_index_stats", self.host);
        let resp = self.client.get(&url).send().await?;
        let _: Value = read_json(resp, &url).await?;
        Ok(())
    }
}

fn build_client(api_key: &str, timeout_secs: u64) -> Result<Client, IndexError> {
    let mut headers = HeaderMap::new();
    let mut key = HeaderValue::from_str(api_key)
        .map_err(|e| IndexError::Config(format!("invalid PINECONE_API_KEY: {e}")))?;
    key.set_sensitive(true);
    headers.insert(HeaderName::from_static(API_KEY_HEADER), key);
    headers.insert(
        HeaderName::from_static(API_VERSION_HEADER),
        HeaderValue::from_static(API_VERSION),
    );

    Ok(Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

/// Prefixes `https://` when the host has no scheme; strips trailing slashes.
fn normalize_host(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

async fn read_json<T: for<'de> Deserialize<'de>>(
    resp: reqwest::Response,
    url: &str,
) -> Result<T, IndexError> {
    let status = resp.status();
    let text = resp.text().await?;
    if !status.is_success() {
        return Err(IndexError::HttpStatus {
            status,
            url: url.to_string(),
            snippet: snippet(&text),
        });
    }
    serde_json::from_str(&text).map_err(|e| IndexError::Decode(e.to_string()))
}

fn passages_from(resp: QueryResponse) -> Result<Vec<RetrievedPassage>, IndexError> {
    resp.matches
        .into_iter()
        .map(|m| RetrievedPassage::from_metadata(&m.id, m.score, m.metadata.as_ref()))
        .collect()
}

fn snippet(body: &str) -> String {
    let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= SNIPPET_MAX_CHARS {
        return collapsed;
    }
    let mut out: String = collapsed.chars().take(SNIPPET_MAX_CHARS).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_normalization() {
        assert_eq!(
            normalize_host("cra-index-abc.svc.us-east-1.pinecone.io"),
            "https://cra-index-abc.svc.us-east-1.pinecone.io"
        );
        assert_eq!(normalize_host("http://localhost:5081/"), "http://localhost:5081");
    }

    #[test]
    fn query_body_uses_camel_case() {
        let v = [0.1_f32, 0.2];
        let body = QueryRequest {
            vector: &v,
            top_k: 3,
            namespace: "__default__",
            include_metadata: true,
            include_values: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["topK"], 3);
        assert_eq!(json["namespace"], "__default__");
        assert_eq!(json["includeMetadata"], true);
        assert_eq!(json["includeValues"], false);
    }

    #[test]
    fn matches_keep_order() {
        let raw = r#"{
            "matches": [
                {"id": "a", "score": 0.91, "metadata": {"text": "first"}},
                {"id": "b", "score": 0.72, "metadata": {"text": "second"}}
            ],
            "namespace": "__default__"
        }"#;
        let resp: QueryResponse = serde_json::from_str(raw).unwrap();
        let passages = passages_from(resp).unwrap();
        let texts: Vec<_> = passages.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, ["first", "second"]);
    }

    #[test]
    fn empty_matches_are_fine() {
        let resp: QueryResponse = serde_json::from_str(r#"{"namespace": "x"}"#).unwrap();
        assert!(passages_from(resp).unwrap().is_empty());
    }

    #[test]
    fn long_error_bodies_are_cut_with_a_marker() {
        let body = "x ".repeat(SNIPPET_MAX_CHARS);
        let s = snippet(&body);
        assert!(s.ends_with('…'));
        assert_eq!(s.chars().count(), SNIPPET_MAX_CHARS + 1);

        assert_eq!(snippet("  index\n not found "), "index not found");
    }

    #[test]
    fn match_without_text_is_malformed() {
        let raw = r#"{"matches": [{"id": "a", "score": 0.5, "metadata": {"title": "t"}}]}"#;
        let resp: QueryResponse = serde_json::from_str(raw).unwrap();
        assert!(passages_from(resp).unwrap_err().is_malformed());
    }
}
