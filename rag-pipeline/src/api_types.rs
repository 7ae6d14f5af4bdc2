//! Public API types re-used by external crates (e.g., the HTTP API layer).

use serde::Serialize;

/// Final answer of one query run.
///
/// `confidence` is `None` when no log-probability data was available;
/// it serializes as `null`.
///
/// # Example
/// ```
/// use rag_pipeline::QueryAnswer;
/// let qa = QueryAnswer { response: "The right to erasure.".into(), confidence: None };
/// let json = serde_json::to_string(&qa).unwrap();
/// assert_eq!(json, r#"{"response":"The right to erasure.","confidence":null}"#);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueryAnswer {
    pub response: String,
    pub confidence: Option<f64>,
}
