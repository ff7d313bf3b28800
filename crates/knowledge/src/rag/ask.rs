//! Query orchestration.
//!
//! One call runs the whole pipeline for one question: snapshot the clock,
//! search, filter, aggregate, build the prompt, ask the model and format.
//! Every failure ends in [`QueryOutcome::Failed`]; nothing escapes as an
//! error.

use crate::aggregate::aggregate;
use crate::embeddings::create_embedding_provider;
use crate::filter::filter_hits;
use crate::lancedb_search::LanceDbSearch;
use crate::rag::types::{GroundedAnswer, QueryOutcome};
use crate::search::SearchProvider;
use docqa_core::config::RetrievalConfig;
use docqa_core::{AppConfig, AppResult, Clock, SystemClock};
use docqa_llm::{create_client, AnswerService};
use docqa_prompt::{resolve_prompt, PromptBuilder};
use std::sync::Arc;
use std::time::Instant;

/// Runs grounded question answering against injected collaborators.
pub struct QueryOrchestrator {
    search: Arc<dyn SearchProvider>,
    answers: AnswerService,
    prompt: PromptBuilder,
    clock: Arc<dyn Clock>,
    retrieval: RetrievalConfig,
}

impl QueryOrchestrator {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        answers: AnswerService,
        prompt: PromptBuilder,
        clock: Arc<dyn Clock>,
        retrieval: RetrievalConfig,
    ) -> Self {
        Self {
            search,
            answers,
            prompt,
            clock,
            retrieval,
        }
    }

    /// Wire the production collaborators from configuration.
    ///
    /// Fails with a configuration error when the API key is missing, before
    /// the index is touched.
    pub async fn from_config(config: &AppConfig) -> AppResult<Self> {
        let api_key = config.require_api_key()?;

        let client = create_client(
            &config.provider,
            Some(config.endpoint.as_str()),
            Some(api_key),
        )?;
        let embedder = create_embedding_provider(
            &config.provider,
            &config.endpoint,
            Some(api_key),
            &config.embedding.model,
        )?;

        let definition = resolve_prompt(config.prompt.file.as_deref())?;
        let prompt = PromptBuilder::new(&definition)?;

        let search = LanceDbSearch::open(&config.index, embedder).await?;

        Ok(Self::new(
            Arc::new(search),
            AnswerService::from_config(client, config),
            prompt,
            Arc::new(SystemClock::new(config.clock.weekday_language)),
            config.retrieval.clone(),
        ))
    }

    /// Answer one question.
    pub async fn ask(&self, question: &str) -> QueryOutcome {
        match self.run(question).await {
            Ok(outcome) => outcome,
            Err(e) => {
                if e.is_provider_error() {
                    tracing::error!("Provider call failed: {}", e);
                } else {
                    tracing::error!("Query failed: {}", e);
                }
                QueryOutcome::Failed(e)
            }
        }
    }

    async fn run(&self, question: &str) -> AppResult<QueryOutcome> {
        let started = Instant::now();

        // Taken once so every later step sees the same time
        let current_time = self.clock.now();

        tracing::info!(
            top_k = self.retrieval.top_k,
            threshold = self.retrieval.threshold,
            "Answering question via {}",
            self.search.name()
        );

        let hits = self.search.search(question, self.retrieval.top_k).await?;
        tracing::debug!(
            "Search returned {} hits - scores: {:?}",
            hits.len(),
            hits.iter().map(|h| h.score).collect::<Vec<_>>()
        );

        let relevant = filter_hits(hits, self.retrieval.threshold);
        if relevant.is_empty() {
            tracing::info!(
                "No relevant passages found (all scores below {:.2} threshold)",
                self.retrieval.threshold
            );
            return Ok(QueryOutcome::NoResult);
        }

        let max_score = relevant
            .iter()
            .map(|hit| hit.score())
            .fold(f32::NEG_INFINITY, f32::max);

        let (context, sources) = aggregate(&relevant, &self.retrieval.source_key);
        let prompt = self.prompt.build(&context, question, &current_time)?;
        let answer = self.answers.complete(prompt.as_str()).await?;

        tracing::info!(
            model = self.answers.model(),
            passages = relevant.len(),
            sources = sources.len(),
            max_score,
            latency_ms = started.elapsed().as_millis() as u64,
            "Answered question"
        );

        Ok(QueryOutcome::Answered(GroundedAnswer {
            answer,
            sources,
            max_score,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fakes::{hit, FakeLlm, FakeSearch, SequenceClock};
    use docqa_core::AppError;

    fn orchestrator(
        search: Arc<FakeSearch>,
        llm: Arc<FakeLlm>,
        clock: Arc<dyn Clock>,
    ) -> QueryOrchestrator {
        QueryOrchestrator::new(
            search,
            AnswerService::new(llm, "gpt-4o-mini", 4000, 0.2),
            PromptBuilder::builtin().unwrap(),
            clock,
            RetrievalConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_clock_is_read_once_per_query() {
        let search = Arc::new(FakeSearch::with_hits(vec![hit("Besøgstid 14-20", 0.9, Some("u1"))]));
        let llm = Arc::new(FakeLlm::answering("Fra 14 til 20."));
        let clock = Arc::new(SequenceClock::new(&["mandag 08:00", "mandag 08:01"]));

        let outcome = orchestrator(search, llm.clone(), clock.clone()).ask("Besøgstid?").await;

        assert!(outcome.is_answered());
        assert_eq!(clock.reads(), 1);
        assert!(llm.last_prompt().unwrap().contains("Klokken er nu: mandag 08:00."));
    }

    #[tokio::test]
    async fn test_requests_configured_top_k() {
        let search = Arc::new(FakeSearch::with_hits(Vec::new()));
        let llm = Arc::new(FakeLlm::answering("unused"));

        let orchestrator = QueryOrchestrator::new(
            search.clone(),
            AnswerService::new(llm, "gpt-4o-mini", 4000, 0.2),
            PromptBuilder::builtin().unwrap(),
            Arc::new(docqa_core::FixedClock::new("fredag 12:00")),
            RetrievalConfig {
                top_k: 5,
                ..RetrievalConfig::default()
            },
        );
        orchestrator.ask("q").await;

        assert_eq!(search.requested_k(), vec![5]);
    }

    #[tokio::test]
    async fn test_search_failure_is_reported() {
        let search = Arc::new(FakeSearch::failing("index unavailable"));
        let llm = Arc::new(FakeLlm::answering("unused"));

        let outcome = orchestrator(
            search,
            llm.clone(),
            Arc::new(docqa_core::FixedClock::new("fredag 12:00")),
        )
        .ask("q")
        .await;

        assert!(matches!(outcome, QueryOutcome::Failed(AppError::Search(_))));
        assert_eq!(outcome.to_string(), "An error occurred: Search failed: index unavailable");
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_answer_keeps_max_score() {
        let search = Arc::new(FakeSearch::with_hits(vec![
            hit("a", 0.72, Some("u1")),
            hit("b", 0.91, Some("u2")),
        ]));
        let llm = Arc::new(FakeLlm::answering("svar"));

        let outcome = orchestrator(
            search,
            llm,
            Arc::new(docqa_core::FixedClock::new("fredag 12:00")),
        )
        .ask("q")
        .await;

        match outcome {
            QueryOutcome::Answered(grounded) => assert!((grounded.max_score - 0.91).abs() < 1e-6),
            other => panic!("expected answer, got {:?}", other),
        }
    }
}
