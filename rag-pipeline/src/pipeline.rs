//! Query orchestrator: embed, retrieve, prompt, generate, score.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::api_types::QueryAnswer;
use crate::cfg::PipelineConfig;
use crate::confidence;
use crate::error::{PipelineError, Stage};
use crate::ports::{Embedder, Generator, PortFuture, Retriever};
use crate::prompt;

/// Sequential RAG pipeline over injected collaborators.
///
/// Holds no per-request state; one instance is shared by all requests.
#[derive(Clone)]
pub struct QueryPipeline {
    embedder: Arc<dyn Embedder>,
    retriever: Arc<dyn Retriever>,
    generator: Arc<dyn Generator>,
    cfg: PipelineConfig,
}

impl QueryPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        retriever: Arc<dyn Retriever>,
        generator: Arc<dyn Generator>,
        cfg: PipelineConfig,
    ) -> Self {
        Self {
            embedder,
            retriever,
            generator,
            cfg,
        }
    }

    /// Answers `query` with retrieved context and a confidence score.
    ///
    /// The first failing stage ends the run; nothing is retried.
    ///
    /// # Errors
    /// [`PipelineError`] classified by the failing stage.
    pub async fn run(&self, query: &str) -> Result<QueryAnswer, PipelineError> {
        let res = self.run_stages(query).await;
        if let Err(e) = &res {
            error!(code = e.code(), error = %e, query, "query pipeline failed");
        }
        res
    }

    async fn run_stages(&self, query: &str) -> Result<QueryAnswer, PipelineError> {
        info!(query, "received");

        let vector = bounded(
            Stage::Embedding,
            self.cfg.embed_timeout,
            self.embedder.embed(query),
        )
        .await?;
        info!(
            head = ?&vector[..vector.len().min(3)],
            dims = vector.len(),
            "embedded"
        );

        let passages = bounded(
            Stage::Retrieval,
            self.cfg.retrieve_timeout,
            self.retriever.retrieve(&vector, self.cfg.top_k),
        )
        .await?;
        let texts: Vec<&str> = passages.iter().map(|p| p.text.as_str()).collect();
        info!(
            matches = passages.len(),
            context = %prompt::build_context(&texts),
            "retrieved"
        );

        let messages = prompt::assemble_messages(query, &texts);
        info!(messages = messages.len(), "prompt built");

        let completion = bounded(
            Stage::Generation,
            self.cfg.generate_timeout,
            self.generator.generate(&messages, true),
        )
        .await?;
        info!(
            text = %completion.text,
            tokens_with_logprobs = ?completion.logprobs.as_ref().map(Vec::len),
            "generated"
        );

        let confidence = completion.logprobs.as_deref().and_then(|lps| {
            let values: Vec<f64> = lps.iter().map(|t| t.logprob).collect();
            confidence::estimate(&values)
        });
        info!(confidence = ?confidence, "score computed");

        let answer = QueryAnswer {
            response: completion.text,
            confidence,
        };
        info!("responded");
        Ok(answer)
    }
}

async fn bounded<T>(
    stage: Stage,
    limit: Duration,
    fut: PortFuture<'_, T>,
) -> Result<T, PipelineError> {
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(v)) => Ok(v),
        Ok(Err(e)) => Err(PipelineError::from_port(stage, e)),
        Err(_) => Err(PipelineError::timeout(stage, limit)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ai_llm_service::{ChatCompletion, ChatMessage, TokenLogProb};
    use vector_index::RetrievedPassage;

    use super::*;
    use crate::error::PortError;

    #[derive(Default)]
    struct FakeEmbedder {
        calls: AtomicUsize,
        seen: Mutex<Vec<String>>,
        delay: Option<Duration>,
        fail: Option<PortError>,
    }

    impl Embedder for FakeEmbedder {
        fn embed<'a>(&'a self, text: &'a str) -> PortFuture<'a, Vec<f32>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                self.seen.lock().unwrap().push(text.to_string());
                if let Some(d) = self.delay {
                    tokio::time::sleep(d).await;
                }
                match &self.fail {
                    Some(e) => Err(e.clone()),
                    None => Ok(vec![0.1, 0.2, 0.3]),
                }
            })
        }
    }

    struct FakeRetriever {
        calls: AtomicUsize,
        result: Result<Vec<RetrievedPassage>, PortError>,
    }

    impl FakeRetriever {
        fn ok(passages: &[(&str, f32)]) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result: Ok(passages
                    .iter()
                    .map(|(t, s)| RetrievedPassage {
                        text: t.to_string(),
                        score: *s,
                    })
                    .collect()),
            }
        }

        fn failing(err: PortError) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result: Err(err),
            }
        }
    }

    impl Retriever for FakeRetriever {
        fn retrieve<'a>(
            &'a self,
            _vector: &'a [f32],
            _top_k: u64,
        ) -> PortFuture<'a, Vec<RetrievedPassage>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                self.result.clone()
            })
        }
    }

    struct FakeGenerator {
        calls: AtomicUsize,
        last_messages: Mutex<Vec<ChatMessage>>,
        result: Result<ChatCompletion, PortError>,
    }

    impl FakeGenerator {
        fn answer(text: &str, logprobs: Option<&[f64]>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last_messages: Mutex::new(Vec::new()),
                result: Ok(ChatCompletion {
                    text: text.to_string(),
                    logprobs: logprobs.map(|lps| {
                        lps.iter()
                            .map(|lp| TokenLogProb {
                                token: "t".into(),
                                logprob: *lp,
                            })
                            .collect()
                    }),
                }),
            }
        }

        fn failing(err: PortError) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last_messages: Mutex::new(Vec::new()),
                result: Err(err),
            }
        }
    }

    impl Generator for FakeGenerator {
        fn generate<'a>(
            &'a self,
            messages: &'a [ChatMessage],
            logprobs: bool,
        ) -> PortFuture<'a, ChatCompletion> {
            Box::pin(async move {
                assert!(logprobs, "log-probabilities must be requested");
                self.calls.fetch_add(1, Ordering::SeqCst);
                *self.last_messages.lock().unwrap() = messages.to_vec();
                self.result.clone()
            })
        }
    }

    fn pipeline(
        e: &Arc<FakeEmbedder>,
        r: &Arc<FakeRetriever>,
        g: &Arc<FakeGenerator>,
        cfg: PipelineConfig,
    ) -> QueryPipeline {
        QueryPipeline::new(e.clone(), r.clone(), g.clone(), cfg)
    }

    #[tokio::test]
    async fn answers_with_confidence() {
        let e = Arc::new(FakeEmbedder::default());
        let r = Arc::new(FakeRetriever::ok(&[("GDPR grants the right to erasure.", 0.9)]));
        let g = Arc::new(FakeGenerator::answer(
            "The right to erasure.",
            Some(&[-0.1, -0.05]),
        ));
        let p = pipeline(&e, &r, &g, PipelineConfig::default());

        let qa = p.run("What does GDPR grant?").await.unwrap();
        assert_eq!(qa.response, "The right to erasure.");
        let c = qa.confidence.unwrap();
        assert!((c - 92.8).abs() < 0.1, "confidence was {c}");

        assert_eq!(e.seen.lock().unwrap().as_slice(), ["What does GDPR grant?"]);
        let msgs = g.last_messages.lock().unwrap();
        assert!(msgs[1].content.contains("Context: GDPR grants the right to erasure."));
        assert!(msgs[1].content.contains("Question: What does GDPR grant?"));
    }

    #[tokio::test]
    async fn retrieval_failure_skips_generation() {
        let e = Arc::new(FakeEmbedder::default());
        let r = Arc::new(FakeRetriever::failing(PortError::Upstream(
            "HTTP 503 from index".into(),
        )));
        let g = Arc::new(FakeGenerator::answer("unused", None));
        let p = pipeline(&e, &r, &g, PipelineConfig::default());

        let err = p.run("q").await.unwrap_err();
        assert_eq!(err.code(), "RETRIEVAL_FAILURE");
        assert!(err.to_string().contains("HTTP 503 from index"));
        assert_eq!(g.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_logprobs_leave_confidence_empty() {
        let e = Arc::new(FakeEmbedder::default());
        let r = Arc::new(FakeRetriever::ok(&[("p", 0.5)]));
        let g = Arc::new(FakeGenerator::answer("answer", None));
        let p = pipeline(&e, &r, &g, PipelineConfig::default());

        let qa = p.run("q").await.unwrap();
        assert_eq!(qa.response, "answer");
        assert_eq!(qa.confidence, None);
    }

    #[tokio::test]
    async fn empty_logprob_list_leaves_confidence_empty() {
        let e = Arc::new(FakeEmbedder::default());
        let r = Arc::new(FakeRetriever::ok(&[("p", 0.5)]));
        let g = Arc::new(FakeGenerator::answer("answer", Some(&[])));
        let p = pipeline(&e, &r, &g, PipelineConfig::default());

        assert_eq!(p.run("q").await.unwrap().confidence, None);
    }

    #[tokio::test]
    async fn no_matches_still_generates() {
        let e = Arc::new(FakeEmbedder::default());
        let r = Arc::new(FakeRetriever::ok(&[]));
        let g = Arc::new(FakeGenerator::answer("I don't know.", Some(&[0.0])));
        let p = pipeline(&e, &r, &g, PipelineConfig::default());

        let qa = p.run("q").await.unwrap();
        assert_eq!(qa.response, "I don't know.");
        assert_eq!(g.calls.load(Ordering::SeqCst), 1);
        let msgs = g.last_messages.lock().unwrap();
        assert!(msgs[1].content.contains("Context: \nAnswer:"));
    }

    #[tokio::test]
    async fn passage_order_is_preserved() {
        let e = Arc::new(FakeEmbedder::default());
        let r = Arc::new(FakeRetriever::ok(&[("low", 0.2), ("high", 0.9)]));
        let g = Arc::new(FakeGenerator::answer("a", None));
        let p = pipeline(&e, &r, &g, PipelineConfig::default());

        p.run("q").await.unwrap();
        let msgs = g.last_messages.lock().unwrap();
        assert!(msgs[1].content.contains("Context: low\n\nhigh\n"));
    }

    #[tokio::test]
    async fn identical_runs_give_identical_answers() {
        let e = Arc::new(FakeEmbedder::default());
        let r = Arc::new(FakeRetriever::ok(&[("p", 0.5)]));
        let g = Arc::new(FakeGenerator::answer("same", Some(&[-0.2])));
        let p = pipeline(&e, &r, &g, PipelineConfig::default());

        let a = p.run("q").await.unwrap();
        let b = p.run("q").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(e.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn malformed_generation_is_reported_as_such() {
        let e = Arc::new(FakeEmbedder::default());
        let r = Arc::new(FakeRetriever::ok(&[("p", 0.5)]));
        let g = Arc::new(FakeGenerator::failing(PortError::Malformed(
            "response contained no message content".into(),
        )));
        let p = pipeline(&e, &r, &g, PipelineConfig::default());

        let err = p.run("q").await.unwrap_err();
        assert_eq!(err.code(), "MALFORMED_RESPONSE");
    }

    #[tokio::test]
    async fn generation_failure_is_classified() {
        let e = Arc::new(FakeEmbedder::default());
        let r = Arc::new(FakeRetriever::ok(&[("p", 0.5)]));
        let g = Arc::new(FakeGenerator::failing(PortError::Upstream("401".into())));
        let p = pipeline(&e, &r, &g, PipelineConfig::default());

        assert_eq!(
            p.run("q").await.unwrap_err(),
            PipelineError::Generation("401".into())
        );
    }

    #[tokio::test]
    async fn slow_embedding_times_out_as_embedding_failure() {
        let e = Arc::new(FakeEmbedder {
            delay: Some(Duration::from_secs(5)),
            ..Default::default()
        });
        let r = Arc::new(FakeRetriever::ok(&[("p", 0.5)]));
        let g = Arc::new(FakeGenerator::answer("a", None));
        let cfg = PipelineConfig {
            embed_timeout: Duration::from_millis(20),
            ..PipelineConfig::default()
        };
        let p = pipeline(&e, &r, &g, cfg);

        let err = p.run("q").await.unwrap_err();
        assert_eq!(err.code(), "EMBEDDING_FAILURE");
        assert_eq!(r.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn embedding_failure_stops_before_index_and_model() {
        let e = Arc::new(FakeEmbedder {
            fail: Some(PortError::Upstream("connection refused".into())),
            ..Default::default()
        });
        let r = Arc::new(FakeRetriever::ok(&[("p", 0.5)]));
        let g = Arc::new(FakeGenerator::answer("unused", None));
        let p = pipeline(&e, &r, &g, PipelineConfig::default());

        let err = p.run("q").await.unwrap_err();
        assert_eq!(err.code(), "EMBEDDING_FAILURE");
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(e.calls.load(Ordering::SeqCst), 1);
        assert_eq!(r.calls.load(Ordering::SeqCst), 0);
        assert_eq!(g.calls.load(Ordering::SeqCst), 0);
    }
}
