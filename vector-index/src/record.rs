//! Core data models used by the library.

use serde::Serialize;
use serde_json::Value;

use crate::errors::IndexError;

/// Metadata/payload key holding the passage text.
pub const TEXT_FIELD: &str = "text";

/// One nearest-neighbor hit: passage text and similarity score.
///
/// Lists of passages keep the order returned by the index (descending similarity).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RetrievedPassage {
    pub text: String,
    pub score: f32,
}

impl RetrievedPassage {
    /// Builds a passage from a match's metadata object.
    ///
    /// # Errors
    /// [`IndexError::MissingText`] when `metadata.text` is absent or not a string.
    pub fn from_metadata(id: &str, score: f32, metadata: Option<&Value>) -> Result<Self, IndexError> {
        let text = metadata
            .and_then(|m| m.get(TEXT_FIELD))
            .and_then(Value::as_str)
            .ok_or_else(|| IndexError::MissingText { id: id.to_string() })?;
        Ok(Self {
            text: text.to_string(),
            score,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_text_metadata() {
        let md = json!({"text": "GDPR grants the right to erasure.", "page": 3});
        let p = RetrievedPassage::from_metadata("a", 0.9, Some(&md)).unwrap();
        assert_eq!(p.text, "GDPR grants the right to erasure.");
        assert_eq!(p.score, 0.9);
    }

    #[test]
    fn missing_or_non_string_text_is_malformed() {
        let err = RetrievedPassage::from_metadata("a", 0.1, None).unwrap_err();
        assert!(err.is_malformed());

        let md = json!({"text": 42});
        let err = RetrievedPassage::from_metadata("b", 0.1, Some(&md)).unwrap_err();
        assert!(matches!(err, IndexError::MissingText { ref id } if id == "b"));
    }
}
