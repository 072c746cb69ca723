//! The answer pipeline: retrieve, rank, then try answer strategies in order.

use super::{
    clean_llm_answer, extractive_answer, truncate_context, Answer, AnswerOrigin, AskOptions,
    ContextRetriever, Retrieved,
};
use crate::chunking::{char_len, Chunk};
use crate::config::{AnswerSettings, LlmSettings, Prompts, Settings};
use crate::error::{DeenbotError, Result};
use crate::language::{Lang, Question, TemplateKey};
use crate::llm::LlmClient;
use crate::ranking::{ChunkRanker, Query};
use crate::transcript::validate_context_id;
use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Ranked material handed to each answer strategy.
pub struct StrategyInput<'a> {
    pub question: &'a str,
    pub lang: Lang,
    /// Selected chunks, best first.
    pub ranked: &'a [Chunk],
}

/// One way of turning ranked chunks into an answer.
///
/// Strategies are tried in order and the first `Ok` wins.
#[async_trait]
pub trait AnswerStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Skipped when the caller opts out of LLM use.
    fn uses_llm(&self) -> bool {
        false
    }

    async fn attempt(&self, input: &StrategyInput<'_>) -> Result<Answer>;
}

/// Rewrites the top chunks with a language model.
pub struct LlmRewriteStrategy {
    llm: Arc<dyn LlmClient>,
    prompts: Prompts,
    timeout: Duration,
    min_answer_chars: usize,
    max_context_chars: usize,
    max_sources: usize,
}

impl LlmRewriteStrategy {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Prompts, settings: &LlmSettings, max_sources: usize) -> Self {
        Self {
            llm,
            prompts,
            timeout: Duration::from_secs(settings.timeout_seconds),
            min_answer_chars: settings.min_answer_chars,
            max_context_chars: settings.max_context_chars,
            max_sources,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl AnswerStrategy for LlmRewriteStrategy {
    fn name(&self) -> &'static str {
        "llm"
    }

    fn uses_llm(&self) -> bool {
        true
    }

    #[instrument(skip_all, fields(model = %self.llm.model()))]
    async fn attempt(&self, input: &StrategyInput<'_>) -> Result<Answer> {
        let sources: Vec<Chunk> = input.ranked.iter().take(self.max_sources).cloned().collect();
        if sources.is_empty() {
            return Err(DeenbotError::Rag("No context chunks to rewrite".to_string()));
        }

        let context = sources
            .iter()
            .map(|c| c.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let context = truncate_context(&context, self.max_context_chars);
        let (system, user) = self.prompts.answer_messages(input.lang, &context, input.question);

        let raw = tokio::time::timeout(self.timeout, self.llm.complete(&system, &user))
            .await
            .map_err(|_| DeenbotError::Llm(format!("Timed out after {:?}", self.timeout)))??;

        let text = clean_llm_answer(&raw, input.lang)
            .ok_or_else(|| DeenbotError::Llm("No usable text in model output".to_string()))?;

        if char_len(&text) < self.min_answer_chars {
            return Err(DeenbotError::Llm(format!(
                "Answer too short ({} chars)",
                char_len(&text)
            )));
        }

        Ok(Answer {
            text,
            sources,
            lang: input.lang,
            origin: AnswerOrigin::Llm,
        })
    }
}

/// Assembles the answer from the chunks themselves. Always succeeds.
#[derive(Debug, Clone)]
pub struct ExtractiveStrategy {
    max_response_length: usize,
    min_answer_chars: usize,
    max_sources: usize,
}

impl ExtractiveStrategy {
    pub fn new(settings: &AnswerSettings) -> Self {
        Self {
            max_response_length: settings.max_response_length,
            min_answer_chars: settings.min_answer_chars,
            max_sources: settings.max_sources,
        }
    }
}

#[async_trait]
impl AnswerStrategy for ExtractiveStrategy {
    fn name(&self) -> &'static str {
        "extractive"
    }

    async fn attempt(&self, input: &StrategyInput<'_>) -> Result<Answer> {
        Ok(extractive_answer(
            input.ranked,
            input.lang,
            self.max_response_length,
            self.min_answer_chars,
            self.max_sources,
        ))
    }
}

/// Answers questions about one transcript context.
///
/// Never fails: every error, and any panic, becomes a templated answer in
/// the question's language.
pub struct AnswerSynthesizer {
    retriever: ContextRetriever,
    ranker: ChunkRanker,
    strategies: Vec<Box<dyn AnswerStrategy>>,
}

impl AnswerSynthesizer {
    pub fn new(
        retriever: ContextRetriever,
        ranker: ChunkRanker,
        strategies: Vec<Box<dyn AnswerStrategy>>,
    ) -> Self {
        Self {
            retriever,
            ranker,
            strategies,
        }
    }

    /// Build the standard strategy order: LLM rewrite when a client is
    /// available, then extraction.
    pub fn from_settings(
        settings: &Settings,
        retriever: ContextRetriever,
        llm: Option<Arc<dyn LlmClient>>,
        prompts: Prompts,
    ) -> Self {
        let mut strategies: Vec<Box<dyn AnswerStrategy>> = Vec::new();
        if let Some(llm) = llm {
            strategies.push(Box::new(LlmRewriteStrategy::new(
                llm,
                prompts,
                &settings.llm,
                settings.answer.max_sources,
            )));
        }
        strategies.push(Box::new(ExtractiveStrategy::new(&settings.answer)));

        Self::new(retriever, ChunkRanker::from_settings(&settings.ranking), strategies)
    }

    /// Names of the configured strategies, in order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Answer a question from the given context.
    #[instrument(skip(self, options))]
    pub async fn answer(&self, question: &str, context_id: &str, options: &AskOptions) -> Answer {
        let question = match options.lang {
            Some(lang) => Question::with_lang(question, lang),
            None => Question::new(question),
        };
        let lang = question.lang;

        let outcome = AssertUnwindSafe(self.run(&question, context_id, options))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(answer)) => answer,
            Ok(Err(e)) => {
                error!(question = %question.text, context_id, "Answer pipeline failed: {}", e);
                Answer::from_template(lang, TemplateKey::Error)
            }
            Err(_) => {
                error!(question = %question.text, context_id, "Answer pipeline panicked");
                Answer::from_template(lang, TemplateKey::Error)
            }
        }
    }

    async fn run(&self, question: &Question, context_id: &str, options: &AskOptions) -> Result<Answer> {
        let lang = question.lang;
        if question.is_blank() || context_id.trim().is_empty() {
            warn!("Missing question or context id");
            return Ok(Answer::from_template(lang, TemplateKey::Insufficient));
        }
        if question.is_greeting() {
            debug!("Question is a greeting");
            return Ok(Answer::from_template(lang, TemplateKey::Greeting));
        }
        if let Err(e) = validate_context_id(context_id) {
            info!("Rejected context id: {}", e);
            return Ok(Answer::from_template(lang, TemplateKey::NoContext));
        }

        let chunks = match self.retriever.retrieve(context_id, &question.text).await? {
            Retrieved::Chunks { chunks, source } => {
                debug!(?source, count = chunks.len(), "Candidate chunks ready");
                chunks
            }
            Retrieved::NotFound => {
                info!("No transcript found for {}", context_id);
                return Ok(Answer::from_template(lang, TemplateKey::NoContext));
            }
        };

        let query = Query::new(question.text.as_str(), lang);
        let ranked: Vec<Chunk> = self
            .ranker
            .select(&query, &chunks)
            .into_iter()
            .map(|scored| scored.chunk)
            .collect();

        let input = StrategyInput {
            question: &question.text,
            lang,
            ranked: &ranked,
        };

        let mut attempted = false;
        for strategy in &self.strategies {
            if strategy.uses_llm() && !options.use_llm {
                debug!("Skipping {} strategy on request", strategy.name());
                continue;
            }
            attempted = true;
            match strategy.attempt(&input).await {
                Ok(answer) => {
                    info!(strategy = strategy.name(), "Answer produced");
                    return Ok(answer);
                }
                Err(e) => warn!("Strategy {} failed: {}, trying next", strategy.name(), e),
            }
        }

        if !attempted {
            warn!("No answer strategy could run");
            return Ok(Answer::from_template(lang, TemplateKey::Fallback));
        }
        Ok(Answer::from_template(lang, TemplateKey::NoAnswer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::TextChunker;
    use crate::language::template;
    use crate::rag::RetrievalSource;
    use crate::transcript::{FileTranscriptStore, TranscriptStore};
    use crate::vector_store::{InMemoryIndex, IndexRegistry, VectorIndex};
    use crate::embedding::HashEmbedder;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PRAYER_TRANSCRIPT: &str = "الصلاة خمس صلوات في اليوم. الزكاة واجبة على كل مسلم قادر.";

    struct StubLlm {
        reply: String,
        calls: AtomicUsize,
    }

    impl StubLlm {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LlmClient for StubLlm {
        fn model(&self) -> &str {
            "stub"
        }

        async fn complete(&self, _system: &str, user: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(user.contains("الصلاة"));
            Ok(self.reply.clone())
        }
    }

    struct SlowLlm;

    #[async_trait]
    impl LlmClient for SlowLlm {
        fn model(&self) -> &str {
            "slow"
        }

        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("too late to matter for anyone".to_string())
        }
    }

    struct PanickingLlm;

    #[async_trait]
    impl LlmClient for PanickingLlm {
        fn model(&self) -> &str {
            "panicking"
        }

        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            panic!("client bug");
        }
    }

    fn empty_index() -> InMemoryIndex {
        InMemoryIndex::new(Arc::new(IndexRegistry::new()), Arc::new(HashEmbedder::new(64)))
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        store: Arc<FileTranscriptStore>,
        settings: Settings,
    }

    impl Fixture {
        async fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let store = Arc::new(FileTranscriptStore::new(dir.path()));
            store.save_transcript("trans_prayer", PRAYER_TRANSCRIPT).await.unwrap();
            store
                .save_transcript("trans_other", "نص عن موضوع آخر تمامًا لا صلة له")
                .await
                .unwrap();
            store.save_transcript("trans_tiny", "لا").await.unwrap();

            let mut settings = Settings::default();
            settings.chunking.min_chunk_size = 10;
            settings.chunking.max_chunk_size = 40;
            Self {
                _dir: dir,
                store,
                settings,
            }
        }

        fn retriever(&self) -> ContextRetriever {
            self.retriever_with(Arc::new(empty_index()))
        }

        fn retriever_with(&self, index: Arc<dyn VectorIndex>) -> ContextRetriever {
            ContextRetriever::new(
                index,
                self.store.clone(),
                Arc::new(TextChunker::from_settings(&self.settings.chunking)),
                5,
            )
        }

        fn synthesizer(&self, llm: Option<Arc<dyn LlmClient>>) -> AnswerSynthesizer {
            AnswerSynthesizer::from_settings(&self.settings, self.retriever(), llm, Prompts::default())
        }

        fn with_timeout(&self, llm: Arc<dyn LlmClient>, timeout: Duration) -> AnswerSynthesizer {
            let strategies: Vec<Box<dyn AnswerStrategy>> = vec![
                Box::new(
                    LlmRewriteStrategy::new(llm, Prompts::default(), &self.settings.llm, 3)
                        .with_timeout(timeout),
                ),
                Box::new(ExtractiveStrategy::new(&self.settings.answer)),
            ];
            AnswerSynthesizer::new(
                self.retriever(),
                ChunkRanker::from_settings(&self.settings.ranking),
                strategies,
            )
        }
    }

    #[tokio::test]
    async fn test_extractive_answer_picks_matching_sentence() {
        let fixture = Fixture::new().await;
        let answer = fixture
            .synthesizer(None)
            .answer("كم عدد الصلوات؟", "trans_prayer", &AskOptions::default())
            .await;

        assert_eq!(answer.origin, AnswerOrigin::Extractive);
        assert_eq!(answer.lang, Lang::Ar);
        assert_eq!(answer.text, "الصلاة خمس صلوات في اليوم.");
        assert_eq!(answer.sources.len(), 1);
    }

    #[tokio::test]
    async fn test_no_match_uses_leading_chunks() {
        let fixture = Fixture::new().await;
        let synthesizer = fixture.synthesizer(None);

        let answer = synthesizer
            .answer("ما حكم الزكاة؟", "trans_other", &AskOptions::default())
            .await;
        assert_eq!(answer.origin, AnswerOrigin::Extractive);
        assert_eq!(answer.text, "نص عن موضوع آخر تمامًا لا صلة له");

        let answer = synthesizer
            .answer("ما حكم الزكاة؟", "trans_tiny", &AskOptions::default())
            .await;
        assert_eq!(answer.text, template(Lang::Ar, TemplateKey::NoAnswer));
    }

    #[tokio::test]
    async fn test_missing_context_and_blank_question() {
        let fixture = Fixture::new().await;
        let synthesizer = fixture.synthesizer(None);

        let answer = synthesizer
            .answer("What is zakat?", "trans_missing", &AskOptions::default())
            .await;
        assert_eq!(answer.origin, AnswerOrigin::Template(TemplateKey::NoContext));
        assert_eq!(answer.text, template(Lang::En, TemplateKey::NoContext));

        let answer = synthesizer.answer("   ", "trans_prayer", &AskOptions::default()).await;
        assert_eq!(answer.origin, AnswerOrigin::Template(TemplateKey::Insufficient));
    }

    #[tokio::test]
    async fn test_llm_answer_wins_when_long_enough() {
        let fixture = Fixture::new().await;
        let llm = Arc::new(StubLlm::new("<think>x</think>عدد الصلوات المفروضة خمس صلوات في اليوم."));
        let synthesizer = fixture.synthesizer(Some(llm.clone()));
        assert_eq!(synthesizer.strategy_names(), vec!["llm", "extractive"]);

        let answer = synthesizer
            .answer("كم عدد الصلوات؟", "trans_prayer", &AskOptions::default())
            .await;
        assert_eq!(answer.origin, AnswerOrigin::Llm);
        assert_eq!(answer.text, "عدد الصلوات المفروضة خمس صلوات في اليوم.");
        assert_eq!(answer.sources[0].content, "الصلاة خمس صلوات في اليوم.");
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_short_llm_answer_falls_back() {
        let fixture = Fixture::new().await;
        let synthesizer = fixture.synthesizer(Some(Arc::new(StubLlm::new("خمس"))));

        let answer = synthesizer
            .answer("كم عدد الصلوات؟", "trans_prayer", &AskOptions::default())
            .await;
        assert_eq!(answer.origin, AnswerOrigin::Extractive);
    }

    #[tokio::test]
    async fn test_llm_can_be_skipped_per_request() {
        let fixture = Fixture::new().await;
        let llm = Arc::new(StubLlm::new("عدد الصلوات المفروضة خمس صلوات في اليوم."));
        let synthesizer = fixture.synthesizer(Some(llm.clone()));

        let options = AskOptions {
            use_llm: false,
            lang: None,
        };
        let answer = synthesizer.answer("كم عدد الصلوات؟", "trans_prayer", &options).await;
        assert_eq!(answer.origin, AnswerOrigin::Extractive);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_llm_timeout_falls_back() {
        let fixture = Fixture::new().await;
        let synthesizer = fixture.with_timeout(Arc::new(SlowLlm), Duration::from_millis(50));

        let answer = synthesizer
            .answer("كم عدد الصلوات؟", "trans_prayer", &AskOptions::default())
            .await;
        assert_eq!(answer.origin, AnswerOrigin::Extractive);
        assert_eq!(answer.text, "الصلاة خمس صلوات في اليوم.");
    }

    #[tokio::test]
    async fn test_panic_becomes_error_template() {
        let fixture = Fixture::new().await;
        let synthesizer = fixture.synthesizer(Some(Arc::new(PanickingLlm)));

        let options = AskOptions {
            use_llm: true,
            lang: Some(Lang::Fr),
        };
        let answer = synthesizer.answer("كم عدد الصلوات؟", "trans_prayer", &options).await;
        assert_eq!(answer.origin, AnswerOrigin::Template(TemplateKey::Error));
        assert_eq!(answer.text, template(Lang::Fr, TemplateKey::Error));
    }

    #[tokio::test]
    async fn test_pipeline_is_idempotent() {
        let fixture = Fixture::new().await;
        let synthesizer = fixture.synthesizer(Some(Arc::new(StubLlm::new(
            "عدد الصلوات المفروضة خمس صلوات في اليوم.",
        ))));

        let first = synthesizer
            .answer("كم عدد الصلوات؟", "trans_prayer", &AskOptions::default())
            .await;
        let second = synthesizer
            .answer("كم عدد الصلوات؟", "trans_prayer", &AskOptions::default())
            .await;
        assert_eq!(first.text, second.text);
        assert_eq!(first.sources, second.sources);
    }

    #[tokio::test]
    async fn test_greeting_gets_greeting_template() {
        let fixture = Fixture::new().await;
        let llm = Arc::new(StubLlm::new("unused"));
        let synthesizer = fixture.synthesizer(Some(llm.clone()));

        let answer = synthesizer
            .answer("السلام عليكم ورحمة الله", "trans_prayer", &AskOptions::default())
            .await;
        assert_eq!(answer.origin, AnswerOrigin::Template(TemplateKey::Greeting));
        assert_eq!(answer.text, template(Lang::Ar, TemplateKey::Greeting));
        assert!(answer.sources.is_empty());
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);

        let answer = synthesizer
            .answer("Bonjour !", "trans_prayer", &AskOptions::default())
            .await;
        assert_eq!(answer.origin, AnswerOrigin::Template(TemplateKey::Greeting));

        // A question that mentions a greeting word is still answered.
        let answer = synthesizer
            .answer("السلام عليكم، كم عدد الصلوات؟", "trans_prayer", &AskOptions { use_llm: false, lang: None })
            .await;
        assert_eq!(answer.origin, AnswerOrigin::Extractive);
    }

    #[tokio::test]
    async fn test_invalid_context_id_is_no_context() {
        let fixture = Fixture::new().await;
        let synthesizer = fixture.synthesizer(None);

        for context_id in ["../etc/passwd", "trans prayer", "trans/prayer"] {
            let answer = synthesizer
                .answer("What is zakat?", context_id, &AskOptions::default())
                .await;
            assert_eq!(
                answer.origin,
                AnswerOrigin::Template(TemplateKey::NoContext),
                "{context_id}"
            );
            assert_eq!(answer.text, template(Lang::En, TemplateKey::NoContext));
        }
    }

    #[tokio::test]
    async fn test_fallback_when_every_strategy_is_skipped() {
        let fixture = Fixture::new().await;
        let strategies: Vec<Box<dyn AnswerStrategy>> = vec![Box::new(LlmRewriteStrategy::new(
            Arc::new(StubLlm::new("unused")),
            Prompts::default(),
            &fixture.settings.llm,
            3,
        ))];
        let synthesizer = AnswerSynthesizer::new(
            fixture.retriever(),
            ChunkRanker::from_settings(&fixture.settings.ranking),
            strategies,
        );

        let options = AskOptions {
            use_llm: false,
            lang: None,
        };
        let answer = synthesizer.answer("كم عدد الصلوات؟", "trans_prayer", &options).await;
        assert_eq!(answer.origin, AnswerOrigin::Template(TemplateKey::Fallback));
        assert_eq!(answer.text, template(Lang::Ar, TemplateKey::Fallback));
    }

    #[tokio::test]
    async fn test_answers_from_populated_index_in_chunk_order() {
        let fixture = Fixture::new().await;
        let index = Arc::new(empty_index());
        let chunks = [
            Chunk::new("الحج مرة في العمر.", 2, "trans_indexed"),
            Chunk::new("الصيام واجب في رمضان.", 0, "trans_indexed"),
            Chunk::new("الصلاة خمس صلوات في اليوم.", 1, "trans_indexed"),
        ];
        assert_eq!(index.add("trans_indexed", &chunks).await.unwrap(), 3);

        // Only the index knows this context; the transcript store does not.
        let retriever = fixture.retriever_with(index.clone());
        match retriever.retrieve("trans_indexed", "كم عدد الصلوات؟").await.unwrap() {
            Retrieved::Chunks { chunks, source } => {
                assert_eq!(source, RetrievalSource::VectorIndex);
                let order: Vec<usize> = chunks.iter().map(|c| c.index).collect();
                assert_eq!(order, vec![0, 1, 2]);
            }
            Retrieved::NotFound => panic!("indexed context reported missing"),
        }

        let synthesizer = AnswerSynthesizer::from_settings(
            &fixture.settings,
            fixture.retriever_with(index),
            None,
            Prompts::default(),
        );

        let answer = synthesizer
            .answer("كم عدد الصلوات؟", "trans_indexed", &AskOptions::default())
            .await;
        assert_eq!(answer.origin, AnswerOrigin::Extractive);
        assert_eq!(answer.text, "الصلاة خمس صلوات في اليوم.");
        assert!(answer.sources.iter().all(|c| c.context_id == "trans_indexed"));

        // No keyword match: the leading chunks are used, in transcript order.
        let answer = synthesizer
            .answer("ما حكم الزكاة؟", "trans_indexed", &AskOptions::default())
            .await;
        assert_eq!(answer.origin, AnswerOrigin::Extractive);
        assert_eq!(answer.text, "الصيام واجب في رمضان. الصلاة خمس صلوات في اليوم.");
    }
}
