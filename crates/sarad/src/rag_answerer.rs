//! Grounded answerer over the tiered retrieval engine.
//!
//! Guarantees: the reply is either text generated strictly from corpus
//! context or the literal refusal string. When every tier comes back
//! empty the synthesizer is never invoked - retrieval failure must not
//! be masked by open generation.

use crate::config::{LlmConfig, RetrievalConfig};
use crate::corpus::{l2_normalize, KnowledgeBase};
use crate::ollama::ModelBackend;
use crate::prompts;
use crate::retrieval;
use sara_common::REFUSAL_REPLY;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Answer cache keyed by normalized question.
///
/// Unbounded for the process lifetime; eviction is a pending product
/// decision, so the policy lives behind this one type.
#[derive(Default)]
pub struct ResponseCache {
    inner: Mutex<HashMap<String, String>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().expect("cache lock poisoned").get(key).cloned()
    }

    /// Last writer wins on concurrent insertion of the same key.
    pub fn insert(&self, key: String, value: String) {
        self.inner.lock().expect("cache lock poisoned").insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Tiered retrieval plus grounded synthesis, with per-question caching.
pub struct RagAnswerer {
    kb: KnowledgeBase,
    cache: ResponseCache,
    llm: LlmConfig,
    retrieval: RetrievalConfig,
}

impl RagAnswerer {
    pub fn new(kb: KnowledgeBase, llm: LlmConfig, retrieval: RetrievalConfig) -> Self {
        Self {
            kb,
            cache: ResponseCache::new(),
            llm,
            retrieval,
        }
    }

    /// Answer a question from the corpus, or refuse.
    pub async fn answer(&self, backend: &dyn ModelBackend, question: &str) -> String {
        let q_norm = retrieval::normalize_question(question);

        if let Some(cached) = self.cache.get(&q_norm) {
            debug!("Cache hit for {:?}", q_norm);
            return cached;
        }

        // Tier 1: exact substring
        let mut contexts = retrieval::exact_matches(&self.kb, &q_norm);

        // Tier 2: person-name token overlap
        if contexts.is_empty() && retrieval::is_person_query(&q_norm) {
            contexts = retrieval::person_matches(&self.kb, &q_norm);
        }

        // Tier 3: semantic search over the prebuilt index
        if contexts.is_empty() {
            contexts = self.semantic_matches(backend, question).await;
        }

        // Hard stop: no grounding context means no generation at all
        if contexts.is_empty() {
            info!("No context in any tier, refusing: {:?}", q_norm);
            self.cache.insert(q_norm, REFUSAL_REPLY.to_string());
            return REFUSAL_REPLY.to_string();
        }

        let contexts = retrieval::assemble_context(
            contexts,
            self.retrieval.max_chunks,
            self.retrieval.max_context_chars,
        );
        let final_reply = self.synthesize(backend, question, &contexts).await;

        self.cache.insert(q_norm, final_reply.clone());
        final_reply
    }

    /// Embed the raw question and collect top-K chunk texts in rank order.
    /// A failed embedding call means this tier yields nothing.
    async fn semantic_matches(&self, backend: &dyn ModelBackend, question: &str) -> Vec<String> {
        let timeout = Duration::from_secs(self.llm.embed_timeout_secs);
        let mut vector = match backend.embed(&self.llm.embed_model, question, timeout).await {
            Ok(v) => v,
            Err(e) => {
                warn!("Embedding failed, skipping semantic tier: {}", e);
                return Vec::new();
            }
        };
        l2_normalize(&mut vector);

        self.kb
            .search(&vector, self.retrieval.top_k)
            .into_iter()
            .filter_map(|id| self.kb.chunk(id))
            .map(|c| c.text.clone())
            .collect()
    }

    /// Context-bounded generation. Empty reply and transport failure both
    /// collapse to the refusal string.
    async fn synthesize(
        &self,
        backend: &dyn ModelBackend,
        question: &str,
        contexts: &[String],
    ) -> String {
        let prompt = prompts::grounded_answer_prompt(question, contexts);
        let timeout = Duration::from_secs(self.llm.generate_timeout_secs);

        match backend.generate(&self.llm.generate_model, &prompt, timeout).await {
            Ok(reply) => {
                let reply = reply.trim();
                if reply.is_empty() {
                    REFUSAL_REPLY.to_string()
                } else {
                    reply.to_string()
                }
            }
            Err(e) => {
                warn!("Grounded generation failed, refusing: {}", e);
                REFUSAL_REPLY.to_string()
            }
        }
    }

    /// Cache size (for tests and status output).
    pub fn cached_answers(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_last_writer_wins() {
        let cache = ResponseCache::new();
        cache.insert("q".into(), "first".into());
        cache.insert("q".into(), "second".into());
        assert_eq!(cache.get("q").as_deref(), Some("second"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_miss() {
        let cache = ResponseCache::new();
        assert!(cache.get("missing").is_none());
        assert!(cache.is_empty());
    }
}
