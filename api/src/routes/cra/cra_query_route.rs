//! POST /cra/query — answers a question with RAG context and a confidence score.

use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use rag_pipeline::QueryAnswer;

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::cra::cra_request::CraQueryRequest,
};

/// Handler: POST /cra/query
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8000/cra/query \
///   -H 'content-type: application/json' \
///   -d '{"query":"What does GDPR grant?"}'
/// ```
pub async fn cra_query(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CraQueryRequest>, JsonRejection>,
) -> AppResult<Json<QueryAnswer>> {
    let Json(body) = payload?;
    if body.query.trim().is_empty() {
        return Err(AppError::BadRequest("query must not be blank".into()));
    }

    let answer = state.pipeline.run(&body.query).await?;
    Ok(Json(answer))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use super::*;
    use crate::test_support::{FakeCollaborators, state_with_pipeline};

    fn request(q: &str) -> Result<Json<CraQueryRequest>, JsonRejection> {
        Ok(Json(CraQueryRequest { query: q.into() }))
    }

    #[tokio::test]
    async fn returns_answer_and_confidence() {
        let fakes = FakeCollaborators::answering(Some(vec![-0.1, -0.05]));
        let state = state_with_pipeline(&fakes);

        let Json(answer) = cra_query(State(state), request("What does GDPR grant?"))
            .await
            .unwrap();
        assert_eq!(answer.response, "The right to erasure.");
        assert!((answer.confidence.unwrap() - 92.8).abs() < 0.1);
    }

    #[tokio::test]
    async fn null_confidence_without_logprobs() {
        let fakes = FakeCollaborators::answering(None);
        let state = state_with_pipeline(&fakes);

        let Json(answer) = cra_query(State(state), request("q")).await.unwrap();
        let json = serde_json::to_value(&answer).unwrap();
        assert_eq!(json["response"], "The right to erasure.");
        assert!(json["confidence"].is_null());
    }

    #[tokio::test]
    async fn blank_query_is_rejected_before_the_pipeline() {
        let fakes = FakeCollaborators::answering(None);
        let state = state_with_pipeline(&fakes);

        let err = cra_query(State(state), request("   ")).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(fakes.embed_calls(), 0);
    }

    #[tokio::test]
    async fn index_failure_maps_to_500() {
        let fakes = FakeCollaborators::failing_index();
        let state = state_with_pipeline(&fakes);

        let err = cra_query(State(state), request("q")).await.unwrap_err();
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "RETRIEVAL_FAILURE");
        assert!(body["message"].as_str().unwrap().starts_with("Error processing query:"));
        assert_eq!(fakes.chat_calls(), 0);
    }
}
